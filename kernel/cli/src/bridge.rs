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

//! Event loop moving frames between the TAP interface and the standard streams.

// Implementation notes:
//
// Stdin and the TAP interface are both registered in level-triggered mode. Stdin is read once per
// readiness notification, so a blocking descriptor never blocks. The TAP interface is
// non-blocking and is polled until it runs dry.

use crate::link;
use ethar_ethernet_interface::{decode, EthernetHeader};
use ethar_tap_hosted::{FrameQueue, TapConfig, TapInterface, FRAME_BUFFER_SIZE};
use mio::{unix::EventedFd, Events, Poll, PollOpt, Ready, Token};
use std::{
    fs::File,
    io::{self, Read as _, Write as _},
    mem::ManuallyDrop,
    os::unix::io::{AsRawFd as _, FromRawFd as _},
};

const STDIN: Token = Token(0);
const TAP: Token = Token(1);

/// Runs until stdin is closed.
pub fn run(config: &TapConfig) -> io::Result<()> {
    let mut queue = match FrameQueue::open_tap(config) {
        Ok(queue) => queue,
        Err(err) => {
            log::warn!("{}; frames from the link will be discarded", err);
            FrameQueue::unsupported()
        }
    };

    // The descriptor belongs to `io::stdin()` and must not be closed.
    let stdin_fd = io::stdin().as_raw_fd();
    let mut stdin = ManuallyDrop::new(unsafe { File::from_raw_fd(stdin_fd) });
    let mut stdout = io::stdout();

    let poll = Poll::new()?;
    poll.register(
        &EventedFd(&stdin_fd),
        STDIN,
        Ready::readable(),
        PollOpt::level(),
    )?;
    if let Some(interface) = queue.interface() {
        log::info!("bridging {}", interface.name());
        poll.register(
            &EventedFd(&interface.as_raw_fd()),
            TAP,
            Ready::readable(),
            PollOpt::level(),
        )?;
    }

    let mut events = Events::with_capacity(16);
    let mut decoder = link::FrameDecoder::new();
    let mut read_buffer = [0; 4096];
    let mut drain_buffer = [0; FRAME_BUFFER_SIZE];

    loop {
        match poll.poll(&mut events, None) {
            Ok(_) => {}
            Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }

        for event in events.iter() {
            match event.token() {
                STDIN => {
                    let len = match stdin.read(&mut read_buffer) {
                        Ok(0) => {
                            log::info!("link closed");
                            queue.close();
                            return Ok(());
                        }
                        Ok(len) => len,
                        Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
                        Err(err) => return Err(err),
                    };

                    decoder.extend(&read_buffer[..len]);
                    while let Some(frame) = decoder.next_frame() {
                        log_frame("rx", &frame);
                        if let Err(err) = queue.inject(&frame) {
                            log::warn!("frame from the link dropped: {}", err);
                        }
                    }
                }
                TAP => {
                    forward_pending(&mut queue, &mut drain_buffer, &mut stdout)?;
                }
                _ => unreachable!(),
            }
        }
    }
}

/// Reads everything the interface has to send and writes it to `out`.
fn forward_pending(
    queue: &mut FrameQueue<TapInterface>,
    buffer: &mut [u8],
    out: &mut impl io::Write,
) -> io::Result<()> {
    while queue.poll() {
        let len = queue.drain(buffer);
        if len == 0 {
            continue;
        }
        log_frame("tx", &buffer[..len]);
        link::write_frame(out, &buffer[..len])?;
    }
    out.flush()
}

fn log_frame(direction: &str, frame: &[u8]) {
    match EthernetHeader::parse(frame) {
        Some(header) => log::debug!(
            "{} {} -> {}, ethertype 0x{:04x}, {} bytes",
            direction,
            decode(header.source),
            decode(header.destination),
            header.ethertype,
            frame.len()
        ),
        None => log::debug!("{} runt frame, {} bytes", direction, frame.len()),
    }
}
