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

//! Command-line tool bridging a callsign-addressed TAP interface to an external link.

use ethar_ethernet_interface::{decode, encode_with_ssid_suffix, HardwareAddress};
use ethar_tap_hosted::TapConfig;
use std::{error::Error, process};
use structopt::StructOpt;

mod bridge;
mod link;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "ethar",
    about = "Ethernet interfaces addressed by amateur radio callsigns."
)]
struct CliOptions {
    /// Prints more logs. Can be repeated.
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Prints the hardware address of a station.
    Encode {
        /// Callsign, optionally followed by `-` and an SSID between 0 and 15.
        callsign: String,
        /// Produce the address of a group of stations.
        #[structopt(long)]
        multicast: bool,
    },

    /// Prints the station a hardware address belongs to.
    Decode {
        /// Address in the `xx:xx:xx:xx:xx:xx` notation.
        address: HardwareAddress,
    },

    /// Creates a TAP interface and forwards its frames to and from stdin and stdout.
    ///
    /// Each frame on stdin and stdout is preceded with its length as a big-endian 16 bits
    /// number.
    Bridge {
        /// Callsign of this station, optionally followed by `-` and an SSID.
        callsign: String,
        /// Name of the interface to create.
        #[structopt(long, default_value = "ethar0")]
        name: String,
    },
}

fn main() {
    let cli_opts = CliOptions::from_args();

    let max_level = match cli_opts.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    ethar_log_hosted::try_init(max_level).expect("failed to initialize logging");

    if let Err(err) = run(cli_opts.command) {
        log::error!("{}", err);
        process::exit(1);
    }
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Encode {
            callsign,
            multicast,
        } => {
            let address = encode_with_ssid_suffix(&callsign, multicast)?;
            println!("{}", address);
        }
        Command::Decode { address } => {
            let station = decode(address);
            if station.multicast {
                println!("{} (multicast)", station);
            } else {
                println!("{}", station);
            }
        }
        Command::Bridge { callsign, name } => {
            let hardware_address = encode_with_ssid_suffix(&callsign, false)?;
            log::info!("{} is {}", callsign, hardware_address);
            bridge::run(&TapConfig {
                name,
                hardware_address,
            })?;
        }
    }

    Ok(())
}
