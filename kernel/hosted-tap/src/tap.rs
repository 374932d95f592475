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

//! Convenient API around the TAP interface.

use ethar_ethernet_interface::HardwareAddress;
use std::{error, fmt, io};

/// Virtual Ethernet interface whose frames are read and written from user space.
pub trait VirtualInterface {
    /// Reads one frame into `buffer` and returns its length.
    ///
    /// Must not block. Returns an error of kind [`io::ErrorKind::WouldBlock`] if no frame is
    /// available.
    fn recv(&mut self, buffer: &mut [u8]) -> io::Result<usize>;

    /// Writes one frame and returns the number of bytes that the interface accepted.
    fn send(&mut self, frame: &[u8]) -> io::Result<usize>;
}

/// Configuration of a TAP interface to create.
#[derive(Debug, Clone)]
pub struct TapConfig {
    /// Name of the interface. If empty, the kernel picks one.
    pub name: String,
    /// Hardware address programmed into the interface before it is brought up.
    pub hardware_address: HardwareAddress,
}

/// Error that can happen during [`TapInterface::new`].
#[derive(Debug, derive_more::Display)]
pub enum OpenError {
    /// This platform has no TAP interfaces.
    #[display(fmt = "TAP interfaces aren't available on this platform")]
    InterfaceUnavailable,
    /// Creating or configuring the interface failed.
    #[display(fmt = "failed to set up TAP interface: {}", _0)]
    Io(io::Error),
}

impl error::Error for OpenError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            OpenError::InterfaceUnavailable => None,
            OpenError::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for OpenError {
    fn from(err: io::Error) -> Self {
        OpenError::Io(err)
    }
}

#[cfg(target_os = "linux")]
pub use linux::TapInterface;

#[cfg(not(target_os = "linux"))]
pub use unsupported::TapInterface;

#[cfg(target_os = "linux")]
mod linux {
    use super::{OpenError, TapConfig, VirtualInterface};
    use ethar_ethernet_interface::HardwareAddress;
    use std::{io, mem, net::UdpSocket, os::unix::io::AsRawFd};

    /// TAP interface opened in non-blocking mode.
    pub struct TapInterface {
        inner: tun_tap::Iface,
    }

    impl TapInterface {
        /// Creates a new TAP interface, assigns its hardware address and brings it up.
        ///
        /// > **Note**: It is extremely common for this method to fail because of lack of
        /// >           privilege. It might be a good idea to **not** unwrap this `Result`.
        pub fn new(config: &TapConfig) -> Result<Self, OpenError> {
            let inner = tun_tap::Iface::without_packet_info(&config.name, tun_tap::Mode::Tap)?;

            let mut nonblock: libc::c_int = 1;
            let result = unsafe { libc::ioctl(inner.as_raw_fd(), libc::FIONBIO, &mut nonblock) };
            if result < 0 {
                return Err(io::Error::last_os_error().into());
            }

            set_hardware_address(&inner, config.hardware_address)?;
            bring_up(inner.name())?;

            log::debug!(
                "TAP interface {} up with address {}",
                inner.name(),
                config.hardware_address
            );
            Ok(TapInterface { inner })
        }

        /// Name the kernel gave to the interface.
        pub fn name(&self) -> &str {
            self.inner.name()
        }
    }

    impl VirtualInterface for TapInterface {
        fn recv(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
            self.inner.recv(buffer)
        }

        fn send(&mut self, frame: &[u8]) -> io::Result<usize> {
            self.inner.send(frame)
        }
    }

    impl AsRawFd for TapInterface {
        fn as_raw_fd(&self) -> std::os::unix::io::RawFd {
            self.inner.as_raw_fd()
        }
    }

    /// `struct ifreq` holding a hardware address.
    #[repr(C)]
    struct IfReqHwAddr {
        name: [libc::c_char; libc::IFNAMSIZ],
        hwaddr: libc::sockaddr,
        _padding: [u8; 8],
    }

    /// `struct ifreq` holding interface flags.
    #[repr(C)]
    struct IfReqFlags {
        name: [libc::c_char; libc::IFNAMSIZ],
        flags: libc::c_short,
        _padding: [u8; 22],
    }

    pub(super) fn ifreq_name(name: &str) -> io::Result<[libc::c_char; libc::IFNAMSIZ]> {
        // One byte is kept for the terminating zero.
        if name.len() >= libc::IFNAMSIZ || name.bytes().any(|b| b == 0) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid interface name {:?}", name),
            ));
        }

        let mut out = [0; libc::IFNAMSIZ];
        for (dst, src) in out.iter_mut().zip(name.bytes()) {
            *dst = src as libc::c_char;
        }
        Ok(out)
    }

    fn set_hardware_address(iface: &tun_tap::Iface, addr: HardwareAddress) -> io::Result<()> {
        let mut hwaddr: libc::sockaddr = unsafe { mem::zeroed() };
        hwaddr.sa_family = libc::ARPHRD_ETHER;
        for (dst, src) in hwaddr.sa_data.iter_mut().zip(addr.to_bytes().iter()) {
            *dst = *src as libc::c_char;
        }

        let mut request = IfReqHwAddr {
            name: ifreq_name(iface.name())?,
            hwaddr,
            _padding: [0; 8],
        };

        let result =
            unsafe { libc::ioctl(iface.as_raw_fd(), libc::SIOCSIFHWADDR, &mut request) };
        if result < 0 {
            let err = io::Error::last_os_error();
            log::warn!("setting hardware address {} failed: {}", addr, err);
            return Err(err);
        }
        Ok(())
    }

    fn bring_up(name: &str) -> io::Result<()> {
        // Interface flags can only be changed through a socket.
        let socket = UdpSocket::bind("0.0.0.0:0")?;

        let mut request = IfReqFlags {
            name: ifreq_name(name)?,
            flags: 0,
            _padding: [0; 22],
        };

        if unsafe { libc::ioctl(socket.as_raw_fd(), libc::SIOCGIFFLAGS, &mut request) } < 0 {
            return Err(io::Error::last_os_error());
        }
        request.flags |= (libc::IFF_UP | libc::IFF_RUNNING) as libc::c_short;
        if unsafe { libc::ioctl(socket.as_raw_fd(), libc::SIOCSIFFLAGS, &mut request) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

#[cfg(not(target_os = "linux"))]
mod unsupported {
    use super::{OpenError, TapConfig, VirtualInterface};
    use std::io;

    /// TAP interface. Can't be created on this platform.
    pub enum TapInterface {}

    impl TapInterface {
        /// Always fails with [`OpenError::InterfaceUnavailable`].
        pub fn new(_: &TapConfig) -> Result<Self, OpenError> {
            Err(OpenError::InterfaceUnavailable)
        }

        pub fn name(&self) -> &str {
            match *self {}
        }
    }

    impl VirtualInterface for TapInterface {
        fn recv(&mut self, _: &mut [u8]) -> io::Result<usize> {
            match *self {}
        }

        fn send(&mut self, _: &[u8]) -> io::Result<usize> {
            match *self {}
        }
    }

    #[cfg(unix)]
    impl std::os::unix::io::AsRawFd for TapInterface {
        fn as_raw_fd(&self) -> std::os::unix::io::RawFd {
            match *self {}
        }
    }
}

impl fmt::Debug for TapInterface {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("TapInterface").field(&self.name()).finish()
    }
}
