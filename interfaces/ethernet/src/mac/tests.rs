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

#![cfg(test)]

use super::{
    decode, encode, encode_with_ssid_suffix, EncodeError, HardwareAddress, Station, ALPHABET,
};

fn station(callsign: &str, ssid: u8, multicast: bool) -> Station {
    Station {
        callsign: callsign.to_owned(),
        ssid,
        multicast,
    }
}

#[test]
fn known_address() {
    let addr = encode("PI4DFT", 0, false).unwrap();
    assert_eq!(addr.to_bytes(), [0xc2, 0x31, 0xb0, 0xbd, 0x56, 0xa8]);
    assert_eq!(addr.to_bytes()[0] & 0x02, 0x02);
    assert_eq!(addr.to_bytes()[0] & 0x01, 0);
    assert_eq!(decode(addr), station("PI4DFT", 0, false));
}

#[test]
fn ssid_and_multicast_only_touch_first_byte() {
    let addr = encode("PI4DFT", 5, true).unwrap();
    assert_eq!(addr.to_bytes(), [0xd7, 0x31, 0xb0, 0xbd, 0x56, 0xa8]);
    assert_eq!(addr.ssid(), 5);
    assert!(addr.is_multicast());
    assert!(addr.is_locally_administered());
}

#[test]
fn lower_case_is_normalized() {
    assert_eq!(
        encode("pi4dft", 3, false).unwrap(),
        encode("PI4DFT", 3, false).unwrap()
    );
    assert_eq!(
        decode(encode("pI4dFt", 3, false).unwrap()),
        station("PI4DFT", 3, false)
    );
}

#[test]
fn round_trip() {
    // Builds callsigns of every length by walking the alphabet with different strides, so that
    // every symbol shows up at every position.
    for len in 1..=8 {
        for stride in 1..ALPHABET.len() {
            let callsign: String = (0..len)
                .map(|n| char::from(ALPHABET[(n * stride + stride) % ALPHABET.len()]))
                .collect();

            for ssid in 0..=15 {
                for &multicast in &[false, true] {
                    let addr = encode(&callsign, ssid, multicast).unwrap();
                    assert!(addr.is_locally_administered());
                    assert_eq!(
                        decode(addr),
                        station(&callsign, ssid as u8, multicast),
                        "{} {}",
                        callsign,
                        addr
                    );
                }
            }
        }
    }
}

#[test]
fn highest_callsign_fits() {
    let addr = encode("ZZZZZZZZ", 15, true).unwrap();
    assert_eq!(addr.to_bytes(), [0xff, 0x1b, 0x18, 0x88, 0x35, 0xe8]);
    assert!(!addr.is_broadcast());
    assert_eq!(decode(addr), station("ZZZZZZZZ", 15, true));
}

#[test]
fn empty_callsign() {
    let addr = encode("", 0, false).unwrap();
    assert_eq!(addr.to_bytes(), [0xc2, 0x31, 0xd0, 0x17, 0x12, 0xe0]);
    assert_eq!(decode(addr), station("", 0, false));
}

#[test]
fn invalid_ssid() {
    assert_eq!(encode("PI4DFT", -1, false), Err(EncodeError::InvalidSsid(-1)));
    assert_eq!(encode("PI4DFT", 16, false), Err(EncodeError::InvalidSsid(16)));
    assert_eq!(
        encode("PI4DFT", i32::MAX, true),
        Err(EncodeError::InvalidSsid(i32::MAX))
    );
}

#[test]
fn ssid_checked_before_callsign() {
    assert_eq!(encode("AB#CDE", 16, false), Err(EncodeError::InvalidSsid(16)));
}

#[test]
fn invalid_character() {
    assert_eq!(
        encode("AB#CDE", 0, false),
        Err(EncodeError::InvalidCharacter('#'))
    );
    assert_eq!(
        encode("PI4 DFT", 0, false),
        Err(EncodeError::InvalidCharacter(' '))
    );
    assert_eq!(
        encode("PI4DFÉ", 0, false),
        Err(EncodeError::InvalidCharacter('É'))
    );
}

#[test]
fn too_long() {
    assert_eq!(
        encode("ABCDEFGHI", 0, false),
        Err(EncodeError::CallsignTooLong)
    );
}

#[test]
fn broadcast() {
    assert_eq!(decode(HardwareAddress::BROADCAST), station("*", 0, true));
    assert!(HardwareAddress::BROADCAST.is_broadcast());
}

#[test]
fn decode_is_permissive() {
    // Least significant digit is a blank: nothing before it is shown.
    assert_eq!(
        decode(HardwareAddress::from_bytes([0x02, 0, 0, 0, 0, 36])),
        station("", 0, false)
    );
    // Zero digits are valid symbols and not padding.
    assert_eq!(
        decode(HardwareAddress::from_bytes([0x02, 0, 0, 0, 0, 10])),
        station("A0000000", 0, false)
    );
    // Addresses not made by `encode` still decode.
    assert_eq!(
        decode(HardwareAddress::from_bytes([0x00, 0x12, 0x34, 0x56, 0x78, 0x9a])),
        station("UDLOJHU0", 0, false)
    );
}

#[test]
fn suffix() {
    assert_eq!(
        encode_with_ssid_suffix("PI4DFT-5", false).unwrap(),
        encode("PI4DFT", 5, false).unwrap()
    );
    assert_eq!(
        encode_with_ssid_suffix("pi4dft-15", true).unwrap(),
        encode("PI4DFT", 15, true).unwrap()
    );
    assert_eq!(
        encode_with_ssid_suffix("PI4DFT", false).unwrap(),
        encode("PI4DFT", 0, false).unwrap()
    );
}

#[test]
fn suffix_stops_at_space() {
    assert_eq!(
        encode_with_ssid_suffix("PI4DFT 7", false).unwrap(),
        encode("PI4DFT", 0, false).unwrap()
    );
}

#[test]
fn suffix_malformed_defaults_to_zero() {
    assert_eq!(
        encode_with_ssid_suffix("PI4DFT-", false).unwrap(),
        encode("PI4DFT", 0, false).unwrap()
    );
    assert_eq!(
        encode_with_ssid_suffix("PI4DFT-x", false).unwrap(),
        encode("PI4DFT", 0, false).unwrap()
    );
    assert_eq!(
        encode_with_ssid_suffix("PI4DFT-12abc", false).unwrap(),
        encode("PI4DFT", 12, false).unwrap()
    );
}

#[test]
fn suffix_out_of_range() {
    assert_eq!(
        encode_with_ssid_suffix("PI4DFT-16", false),
        Err(EncodeError::InvalidSsid(16))
    );
    assert_eq!(
        encode_with_ssid_suffix("PI4DFT--1", false),
        Err(EncodeError::InvalidSsid(-1))
    );
    assert_eq!(
        encode_with_ssid_suffix("PI4DFT-99999999999", false),
        Err(EncodeError::InvalidSsid(i32::MAX))
    );
}

#[test]
fn suffix_long_callsign() {
    assert_eq!(
        encode_with_ssid_suffix("ABCDEFGH-3", false).unwrap(),
        encode("ABCDEFGH", 3, false).unwrap()
    );
    // Only the first 8 characters are looked at.
    assert_eq!(
        encode_with_ssid_suffix("ABCDEFGHIJ", false).unwrap(),
        encode("ABCDEFGH", 0, false).unwrap()
    );
}

#[test]
fn suffix_invalid_character() {
    assert_eq!(
        encode_with_ssid_suffix("AB#CDE-1", false),
        Err(EncodeError::InvalidCharacter('#'))
    );
}

#[test]
fn display_and_parse() {
    let addr = encode("PI4DFT", 0, false).unwrap();
    assert_eq!(addr.to_string(), "c2:31:b0:bd:56:a8");
    assert_eq!("c2:31:b0:bd:56:a8".parse::<HardwareAddress>().unwrap(), addr);
    assert_eq!("C2:31:B0:BD:56:A8".parse::<HardwareAddress>().unwrap(), addr);
    assert_eq!(
        "2:0:0:0:0:a".parse::<HardwareAddress>().unwrap(),
        HardwareAddress::from_bytes([2, 0, 0, 0, 0, 10])
    );
}

#[test]
fn parse_rejects_garbage() {
    for input in &[
        "",
        "c2:31:b0:bd:56",
        "c2:31:b0:bd:56:a8:00",
        "c2:31:b0:bd:56:",
        "c2:31:b0:bd:56:a8a",
        "c2:31:b0:bd:56:+a",
        "c2-31-b0-bd-56-a8",
        "g2:31:b0:bd:56:a8",
    ] {
        assert!(input.parse::<HardwareAddress>().is_err(), "{}", input);
    }
}

#[test]
fn station_display() {
    assert_eq!(station("PI4DFT", 0, false).to_string(), "PI4DFT");
    assert_eq!(station("PI4DFT", 9, true).to_string(), "PI4DFT-9");
}
