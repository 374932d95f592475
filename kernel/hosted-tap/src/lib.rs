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

//! Queue of outgoing Ethernet frames in front of a
//! [TAP](https://en.wikipedia.org/wiki/TAP_(network_driver)) interface.
//!
//! The [`FrameQueue`] sits between a virtual interface and an external link, for example a radio
//! modem:
//!
//! - Frames received from the link are written to the interface with [`FrameQueue::inject`].
//! - [`FrameQueue::poll`] must be called regularly. It reads what the interface wants to send
//! and stores it.
//! - Stored frames are taken out, oldest first, with [`FrameQueue::drain`].
//!
//! Nothing in this crate blocks or spawns threads. The interface is in non-blocking mode and
//! the caller is expected to call `poll` from its own event loop.
//!
//! If the platform doesn't support TAP interfaces, [`FrameQueue::unsupported`] provides a queue
//! that accepts everything and never produces any frame.

// Implementation notes:
//
// Frames are copied out of a single read buffer into their own allocation before being queued,
// and copied again into the caller's buffer on drain. A frame that doesn't fit the caller's
// buffer is lost.

use std::{collections::VecDeque, error, fmt, io, mem};

mod tap;

pub use tap::{OpenError, TapConfig, TapInterface, VirtualInterface};

/// Size of the buffer frames are read into. Drain buffers of this size never lose frames.
pub const FRAME_BUFFER_SIZE: usize = 2048;

/// Frames read from a virtual interface, waiting to be sent on the external link.
pub struct FrameQueue<I> {
    /// Interface, if any.
    backend: Backend<I>,
    /// Frames read from the interface and not drained yet, oldest first.
    pending: VecDeque<Vec<u8>>,
    /// Buffer the interface is read into.
    read_buffer: Box<[u8]>,
}

enum Backend<I> {
    /// Frames are read from and written to this interface.
    Supported(I),
    /// No interface, either because the platform has none or because the queue was closed.
    Unsupported,
}

/// Error that can happen during [`FrameQueue::inject`].
#[derive(Debug, derive_more::Display)]
pub enum InjectError {
    /// The interface accepted only part of the frame.
    #[display(fmt = "interface accepted {} out of {} bytes", written, expected)]
    ShortWrite { written: usize, expected: usize },
    /// Writing to the interface failed.
    #[display(fmt = "failed to write to interface: {}", _0)]
    Io(io::Error),
}

impl error::Error for InjectError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            InjectError::ShortWrite { .. } => None,
            InjectError::Io(err) => Some(err),
        }
    }
}

impl FrameQueue<TapInterface> {
    /// Creates a TAP interface and a queue around it.
    ///
    /// Fails with [`OpenError::InterfaceUnavailable`] on platforms without TAP interfaces. The
    /// caller can then fall back to [`FrameQueue::unsupported`].
    pub fn open_tap(config: &TapConfig) -> Result<Self, OpenError> {
        Ok(FrameQueue::open(TapInterface::new(config)?))
    }
}

impl<I> FrameQueue<I> {
    /// Initializes an empty queue around an already configured interface.
    pub fn open(interface: I) -> Self {
        FrameQueue {
            backend: Backend::Supported(interface),
            pending: VecDeque::new(),
            read_buffer: vec![0; FRAME_BUFFER_SIZE].into_boxed_slice(),
        }
    }

    /// Initializes a queue without any interface.
    ///
    /// Injecting always succeeds, polling never finds anything, and draining always reports 0.
    pub fn unsupported() -> Self {
        FrameQueue {
            backend: Backend::Unsupported,
            pending: VecDeque::new(),
            read_buffer: Box::new([]),
        }
    }

    /// Returns true if the queue has an interface.
    pub fn is_supported(&self) -> bool {
        matches!(self.backend, Backend::Supported(_))
    }

    /// Returns the interface, if any.
    pub fn interface(&self) -> Option<&I> {
        match &self.backend {
            Backend::Supported(interface) => Some(interface),
            Backend::Unsupported => None,
        }
    }

    pub fn interface_mut(&mut self) -> Option<&mut I> {
        match &mut self.backend {
            Backend::Supported(interface) => Some(interface),
            Backend::Unsupported => None,
        }
    }

    /// Number of frames waiting to be drained.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if at least one frame is waiting to be drained.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Removes the oldest frame from the queue and copies it at the start of `buffer`.
    ///
    /// Returns the length of the frame, or 0 if the queue is empty.
    ///
    /// > **Important**: If `buffer` is smaller than the frame, the frame is discarded and 0 is
    /// >                returned. Use a buffer of [`FRAME_BUFFER_SIZE`] bytes to avoid this.
    pub fn drain(&mut self, buffer: &mut [u8]) -> usize {
        let frame = match self.pending.pop_front() {
            Some(frame) => frame,
            None => return 0,
        };

        if frame.len() > buffer.len() {
            log::debug!(
                "discarding {} bytes frame that doesn't fit in a {} bytes buffer",
                frame.len(),
                buffer.len()
            );
            return 0;
        }

        buffer[..frame.len()].copy_from_slice(&frame);
        frame.len()
    }

    /// Discards all pending frames and closes the interface.
    ///
    /// Calling this more than once, or on a queue without interface, does nothing. The queue then
    /// behaves like one created with [`FrameQueue::unsupported`].
    pub fn close(&mut self) {
        self.pending = VecDeque::new();
        self.read_buffer = Box::new([]);
        if let Backend::Supported(interface) = mem::replace(&mut self.backend, Backend::Unsupported)
        {
            drop(interface);
            log::debug!("interface closed");
        }
    }
}

impl<I: VirtualInterface> FrameQueue<I> {
    /// Writes a frame coming from the external link to the interface.
    ///
    /// The frame doesn't go through the queue. Nothing is retried on failure.
    pub fn inject(&mut self, frame: &[u8]) -> Result<(), InjectError> {
        let interface = match &mut self.backend {
            Backend::Supported(interface) => interface,
            Backend::Unsupported => return Ok(()),
        };

        let written = interface.send(frame).map_err(InjectError::Io)?;
        if written != frame.len() {
            return Err(InjectError::ShortWrite {
                written,
                expected: frame.len(),
            });
        }

        log::trace!("injected {} bytes frame", frame.len());
        Ok(())
    }

    /// Tries to read one frame from the interface and adds it to the end of the queue.
    ///
    /// Returns true if the queue isn't empty, whether or not this call read anything.
    pub fn poll(&mut self) -> bool {
        let interface = match &mut self.backend {
            Backend::Supported(interface) => interface,
            Backend::Unsupported => return !self.pending.is_empty(),
        };

        match interface.recv(&mut self.read_buffer) {
            Ok(0) => {}
            Ok(len) => {
                let mut frame = Vec::new();
                if frame.try_reserve_exact(len).is_ok() && self.pending.try_reserve(1).is_ok() {
                    frame.extend_from_slice(&self.read_buffer[..len]);
                    self.pending.push_back(frame);
                    log::trace!("queued {} bytes frame", len);
                } else {
                    log::debug!("dropping {} bytes frame: out of memory", len);
                }
            }
            Err(ref err)
                if err.kind() == io::ErrorKind::WouldBlock
                    || err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => log::warn!("failed to read from interface: {}", err),
        }

        self.has_pending()
    }
}

impl<I> fmt::Debug for FrameQueue<I> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FrameQueue")
            .field("supported", &self.is_supported())
            .field("pending", &self.pending.len())
            .finish()
    }
}
