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

//! Callsign-derived Ethernet addressing.
//!
//! Amateur radio stations are identified by a callsign (e.g. `PI4DFT`) and an optional
//! secondary station identifier (SSID) in the range 0 to 15. This crate encodes such an
//! identity into a 48-bit Ethernet hardware address and decodes it back, so that a virtual
//! Ethernet interface can be addressed by the station operating it.
//!
//! # Address layout
//!
//! The callsign is read as a base 37 number (digits, letters, and a blank used as padding)
//! which fits in 42 bits. These 42 bits are spread over the address as follows:
//!
//! - Bits 7 and 6 of the first byte contain the two most significant bits of the callsign.
//! - Bits 5 to 2 of the first byte contain the SSID.
//! - Bit 1 of the first byte is the "locally administered" bit and is always set.
//! - Bit 0 of the first byte is the multicast bit.
//! - The five remaining bytes contain the rest of the callsign, most significant byte first.
//!
//! The broadcast address `ff:ff:ff:ff:ff:ff` can never be produced by the encoding and is
//! decoded as the special callsign `*`.
//!
//! # Usage
//!
//! - Call [`encode`] or [`encode_with_ssid_suffix`] to obtain the [`HardwareAddress`] to
//! assign to an interface.
//! - Call [`decode`] to find out which [`Station`] a received frame comes from or goes to.
//! [`EthernetHeader`] extracts both addresses from a frame.
//!

pub mod frame;
pub mod mac;

pub use frame::EthernetHeader;
pub use mac::{
    decode, encode, encode_with_ssid_suffix, EncodeError, HardwareAddress, ParseAddressError,
    Station,
};
