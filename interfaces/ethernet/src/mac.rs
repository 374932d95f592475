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

//! Conversion between stations and hardware addresses.

use byteorder::{BigEndian, ByteOrder as _};
use core::{convert::TryFrom, fmt, str::FromStr};

mod tests;

/// Symbols a callsign can be made of. The position of a symbol in this table is its base 37
/// digit. Digit 36, which has no entry, is the blank used to pad short callsigns.
const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Digit of the blank symbol.
const BLANK: u8 = 36;

const RADIX: u64 = 37;

/// Maximum number of characters in a callsign.
pub const MAX_CALLSIGN_LEN: usize = 8;

/// Highest valid secondary station identifier.
pub const MAX_SSID: u8 = 15;

const MULTICAST_BIT: u8 = 0x01;
const LOCALLY_ADMINISTERED_BIT: u8 = 0x02;
const SSID_MASK: u8 = 0x3c;
const CALLSIGN_HIGH_MASK: u8 = 0xc0;

/// 48-bit Ethernet hardware address, also known as MAC address.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HardwareAddress([u8; 6]);

impl HardwareAddress {
    /// Address that targets every station on the link.
    pub const BROADCAST: HardwareAddress = HardwareAddress([0xff; 6]);

    /// Builds an address from its six bytes, in the order they appear on the wire.
    pub const fn from_bytes(bytes: [u8; 6]) -> Self {
        HardwareAddress(bytes)
    }

    /// Returns the six bytes of the address, in the order they appear on the wire.
    pub const fn to_bytes(self) -> [u8; 6] {
        self.0
    }

    pub fn is_broadcast(&self) -> bool {
        *self == HardwareAddress::BROADCAST
    }

    pub fn is_multicast(&self) -> bool {
        self.0[0] & MULTICAST_BIT != 0
    }

    /// Returns true if the address was assigned locally rather than by a manufacturer. Always
    /// true for addresses returned by [`encode`].
    pub fn is_locally_administered(&self) -> bool {
        self.0[0] & LOCALLY_ADMINISTERED_BIT != 0
    }

    /// Secondary station identifier stored in the address.
    pub fn ssid(&self) -> u8 {
        (self.0[0] & SSID_MASK) >> 2
    }

    /// The 42 bits holding the callsign, as an integer.
    fn callsign_value(&self) -> u64 {
        (u64::from(self.0[0] & CALLSIGN_HIGH_MASK) << 34) | BigEndian::read_uint(&self.0[1..], 5)
    }
}

impl From<[u8; 6]> for HardwareAddress {
    fn from(bytes: [u8; 6]) -> Self {
        HardwareAddress(bytes)
    }
}

impl From<HardwareAddress> for [u8; 6] {
    fn from(addr: HardwareAddress) -> Self {
        addr.0
    }
}

impl AsRef<[u8]> for HardwareAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            a, b, c, d, e, g
        )
    }
}

impl fmt::Debug for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("HardwareAddress")
            .field(&format_args!("{}", self))
            .finish()
    }
}

impl FromStr for HardwareAddress {
    type Err = ParseAddressError;

    /// Parses the `xx:xx:xx:xx:xx:xx` notation. Upper and lower case digits are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0; 6];
        let mut parts = s.split(':');

        for byte in bytes.iter_mut() {
            let part = parts.next().ok_or(ParseAddressError)?;
            if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(ParseAddressError);
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| ParseAddressError)?;
        }

        if parts.next().is_some() {
            return Err(ParseAddressError);
        }

        Ok(HardwareAddress(bytes))
    }
}

/// Error that can happen when parsing a [`HardwareAddress`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display(fmt = "invalid hardware address, expected xx:xx:xx:xx:xx:xx")]
pub struct ParseAddressError;

impl std::error::Error for ParseAddressError {}

/// Error that can happen during [`encode`] or [`encode_with_ssid_suffix`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum EncodeError {
    /// The secondary station identifier isn't between 0 and 15.
    #[display(fmt = "SSID {} is outside of the range 0 to 15", _0)]
    InvalidSsid(i32),
    /// The callsign contains a symbol that isn't a digit or a letter.
    #[display(fmt = "character {:?} can't be part of a callsign", _0)]
    InvalidCharacter(char),
    /// The callsign has more than [`MAX_CALLSIGN_LEN`] characters.
    #[display(fmt = "callsign is longer than 8 characters")]
    CallsignTooLong,
}

impl std::error::Error for EncodeError {}

/// Identity of a station, as found in a [`HardwareAddress`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Station {
    /// Callsign in upper case, without padding. `*` for the broadcast address.
    pub callsign: String,
    /// Secondary station identifier, between 0 and 15.
    pub ssid: u8,
    /// True if the address designates a group of stations.
    pub multicast: bool,
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.ssid == 0 {
            write!(f, "{}", self.callsign)
        } else {
            write!(f, "{}-{}", self.callsign, self.ssid)
        }
    }
}

/// Encodes a callsign and SSID into a hardware address.
///
/// The callsign is case-insensitive and can contain up to [`MAX_CALLSIGN_LEN`] digits and
/// letters.
pub fn encode(callsign: &str, ssid: i32, multicast: bool) -> Result<HardwareAddress, EncodeError> {
    let ssid = u8::try_from(ssid)
        .ok()
        .filter(|ssid| *ssid <= MAX_SSID)
        .ok_or(EncodeError::InvalidSsid(ssid))?;

    let mut digits = [BLANK; MAX_CALLSIGN_LEN];
    for (n, c) in callsign.chars().enumerate() {
        let digit = digits.get_mut(n).ok_or(EncodeError::CallsignTooLong)?;
        *digit = digit_of(c).ok_or(EncodeError::InvalidCharacter(c))?;
    }

    // The last character is the most significant digit.
    let value = digits
        .iter()
        .rev()
        .fold(0u64, |value, digit| value * RADIX + u64::from(*digit));

    let mut bytes = [0; 6];
    bytes[0] = ((value >> 34) as u8 & CALLSIGN_HIGH_MASK)
        | (ssid << 2)
        | LOCALLY_ADMINISTERED_BIT
        | if multicast { MULTICAST_BIT } else { 0 };
    BigEndian::write_uint(&mut bytes[1..], value & 0xff_ffff_ffff, 5);
    Ok(HardwareAddress(bytes))
}

/// Same as [`encode`], but takes the SSID as a suffix of the callsign, such as `PI4DFT-5`.
///
/// The callsign ends at the first `-` or space, or after [`MAX_CALLSIGN_LEN`] characters. The
/// SSID is only read if the callsign is followed by a `-`, and defaults to 0. Anything else
/// after the callsign is ignored.
pub fn encode_with_ssid_suffix(
    callsign: &str,
    multicast: bool,
) -> Result<HardwareAddress, EncodeError> {
    let mut end = callsign.len();
    let mut ssid = 0;

    for (n, (index, c)) in callsign.char_indices().enumerate() {
        if n == MAX_CALLSIGN_LEN || c == '-' || c == ' ' {
            end = index;
            if c == '-' {
                ssid = parse_leading_int(&callsign[index + 1..]);
            }
            break;
        }
    }

    encode(&callsign[..end], ssid, multicast)
}

/// Decodes the station a hardware address belongs to.
///
/// Every address can be decoded, including the ones [`encode`] can't produce. The callsign
/// stops at the first blank digit.
pub fn decode(addr: HardwareAddress) -> Station {
    if addr.is_broadcast() {
        return Station {
            callsign: "*".to_owned(),
            ssid: 0,
            multicast: true,
        };
    }

    let mut value = addr.callsign_value();
    let mut callsign = String::with_capacity(MAX_CALLSIGN_LEN);
    for _ in 0..MAX_CALLSIGN_LEN {
        let digit = (value % RADIX) as usize;
        value /= RADIX;
        match ALPHABET.get(digit) {
            Some(symbol) => callsign.push(char::from(*symbol)),
            None => break,
        }
    }

    Station {
        callsign,
        ssid: addr.ssid(),
        multicast: addr.is_multicast(),
    }
}

/// Returns the base 37 digit of a callsign character, or `None` if it isn't allowed.
fn digit_of(c: char) -> Option<u8> {
    let c = c.to_ascii_uppercase();
    ALPHABET
        .iter()
        .position(|symbol| char::from(*symbol) == c)
        .map(|digit| digit as u8)
}

/// Parses the integer at the start of `s`, after optional whitespace and sign. Returns 0 if
/// there is no digit. Saturates instead of overflowing.
fn parse_leading_int(s: &str) -> i32 {
    let s = s.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, digit| {
            acc.saturating_mul(10)
                .saturating_add(i64::from(digit - b'0'))
        });
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).unwrap_or(if negative { i32::MIN } else { i32::MAX })
}
