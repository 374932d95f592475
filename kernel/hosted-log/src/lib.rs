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

//! Implements the `log` facade by printing logs to stderr.
//!
//! Stdout is left alone, as it might be carrying data.

use std::{borrow::Cow, fmt};

/// Logger printing one line per record on stderr.
pub struct TerminalLogger {
    /// Records more verbose than this are ignored.
    max_level: log::LevelFilter,
    /// If true, enable terminal colors when printing the log messages.
    enable_colors: bool,
}

impl TerminalLogger {
    /// Initializes a new logger.
    pub fn new(max_level: log::LevelFilter) -> Self {
        TerminalLogger {
            max_level,
            enable_colors: atty::is(atty::Stream::Stderr),
        }
    }
}

/// Installs a [`TerminalLogger`] as the global logger.
pub fn try_init(max_level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_boxed_logger(Box::new(TerminalLogger::new(max_level)))?;
    log::set_max_level(max_level);
    Ok(())
}

impl log::Log for TerminalLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut header_style = ansi_term::Style::default();
        if self.enable_colors {
            header_style.is_dimmed = true;
        }

        eprintln!(
            "{}[{}] [{}]{} {}",
            header_style.prefix(),
            record.target(),
            level_tag(record.level()),
            header_style.suffix(),
            sanitize(record.args())
        );
    }

    fn flush(&self) {}
}

fn level_tag(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERR ",
        log::Level::Warn => "WARN",
        log::Level::Info => "INFO",
        log::Level::Debug => "DEBG",
        log::Level::Trace => "TRCE",
    }
}

/// Removes any control character from a log message, in order to prevent data that ends up in
/// messages from polluting the terminal.
fn sanitize(args: &fmt::Arguments) -> Cow<'static, str> {
    let message = match args.as_str() {
        Some(message) => Cow::Borrowed(message),
        None => Cow::Owned(args.to_string()),
    };

    if message.chars().any(|c| c.is_control()) {
        Cow::Owned(message.chars().filter(|c| !c.is_control()).collect())
    } else {
        message
    }
}
