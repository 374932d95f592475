// Copyright (C) 2019-2020  Pierre Krieger
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Minimal view over the header of an Ethernet frame.
//!
//! Frames exchanged with a TAP interface don't include any preamble or checksum. They start
//! directly with the destination address.

use crate::mac::HardwareAddress;
use byteorder::{BigEndian, ByteOrder as _};
use core::convert::TryFrom;

/// Length of the destination, source and EtherType fields.
pub const HEADER_LEN: usize = 14;

/// Addressing information at the start of an Ethernet frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EthernetHeader {
    pub destination: HardwareAddress,
    pub source: HardwareAddress,
    /// Protocol of the payload, or its length for 802.3 frames.
    pub ethertype: u16,
}

impl EthernetHeader {
    /// Reads the header at the start of `frame`. Returns `None` if the frame is too short.
    pub fn parse(frame: &[u8]) -> Option<EthernetHeader> {
        if frame.len() < HEADER_LEN {
            return None;
        }

        Some(EthernetHeader {
            destination: HardwareAddress::from(<[u8; 6]>::try_from(&frame[0..6]).ok()?),
            source: HardwareAddress::from(<[u8; 6]>::try_from(&frame[6..12]).ok()?),
            ethertype: BigEndian::read_u16(&frame[12..14]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::EthernetHeader;
    use crate::mac::{decode, encode, HardwareAddress};

    #[test]
    fn parse_header() {
        let dst = encode("PI4DFT", 1, false).unwrap();
        let src = encode("PA3WEG", 2, false).unwrap();

        let mut frame = Vec::new();
        frame.extend_from_slice(dst.as_ref());
        frame.extend_from_slice(src.as_ref());
        frame.extend_from_slice(&[0x08, 0x06]);
        frame.extend_from_slice(&[0; 28]);

        let header = EthernetHeader::parse(&frame).unwrap();
        assert_eq!(header.destination, dst);
        assert_eq!(header.source, src);
        assert_eq!(header.ethertype, 0x0806);
        assert_eq!(decode(header.source).to_string(), "PA3WEG-2");
    }

    #[test]
    fn broadcast_destination() {
        let mut frame = vec![0xff; 6];
        frame.extend_from_slice(encode("PI4DFT", 0, false).unwrap().as_ref());
        frame.extend_from_slice(&[0x86, 0xdd]);
        let header = EthernetHeader::parse(&frame).unwrap();
        assert_eq!(header.destination, HardwareAddress::BROADCAST);
        assert_eq!(header.ethertype, 0x86dd);
    }

    #[test]
    fn too_short() {
        assert!(EthernetHeader::parse(&[]).is_none());
        assert!(EthernetHeader::parse(&[0xff; 13]).is_none());
    }
}
