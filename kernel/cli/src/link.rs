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

//! Framing of Ethernet frames over a byte stream.
//!
//! Each frame is preceded with its length, as a big-endian `u16`.

use byteorder::{BigEndian, ByteOrder as _, WriteBytesExt as _};
use std::{convert::TryFrom, io};

/// Length of the prefix in front of each frame.
const PREFIX_LEN: usize = 2;

/// Writes one frame to `out`.
pub fn write_frame(out: &mut impl io::Write, frame: &[u8]) -> io::Result<()> {
    let len = u16::try_from(frame.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame too large"))?;
    out.write_u16::<BigEndian>(len)?;
    out.write_all(frame)
}

/// Splits a byte stream back into frames.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Bytes received and not yet returned as a frame.
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        FrameDecoder::default()
    }

    /// Appends data read from the stream.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Returns the next complete frame, if any.
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        if self.buffer.len() < PREFIX_LEN {
            return None;
        }

        let end = PREFIX_LEN + usize::from(BigEndian::read_u16(&self.buffer[..PREFIX_LEN]));
        if self.buffer.len() < end {
            return None;
        }

        let frame = self.buffer[PREFIX_LEN..end].to_vec();
        self.buffer.drain(..end);
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::{write_frame, FrameDecoder};

    #[test]
    fn prefix_is_big_endian() {
        let mut out = Vec::new();
        write_frame(&mut out, &[0xaa; 0x102]).unwrap();
        assert_eq!(&out[..3], &[0x01, 0x02, 0xaa]);
        assert_eq!(out.len(), 0x104);
    }

    #[test]
    fn frames_split_across_reads() {
        let mut stream = Vec::new();
        write_frame(&mut stream, b"first").unwrap();
        write_frame(&mut stream, b"").unwrap();
        write_frame(&mut stream, b"second").unwrap();

        let mut decoder = FrameDecoder::new();
        let mut frames = Vec::new();
        for byte in &stream {
            decoder.extend(&[*byte]);
            while let Some(frame) = decoder.next_frame() {
                frames.push(frame);
            }
        }

        assert_eq!(frames, vec![b"first".to_vec(), Vec::new(), b"second".to_vec()]);
    }

    #[test]
    fn incomplete_frame() {
        let mut decoder = FrameDecoder::new();
        decoder.extend(&[0x00]);
        assert!(decoder.next_frame().is_none());
        decoder.extend(&[0x03, b'a', b'b']);
        assert!(decoder.next_frame().is_none());
        decoder.extend(&[b'c', 0x00]);
        assert_eq!(decoder.next_frame().unwrap(), b"abc");
        assert!(decoder.next_frame().is_none());
    }

    #[test]
    fn oversized_frame_rejected() {
        let mut out = Vec::new();
        assert!(write_frame(&mut out, &vec![0; 70000]).is_err());
        assert!(out.is_empty());
    }
}
