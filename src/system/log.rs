//! Leveled log records for a text console.
//!
//! A [`Logger`] formats each record into a fixed buffer and hands the
//! finished line to an output function in one call. Optional hooks run
//! before and after every record, which lets an interactive shell hide its
//! prompt while the line is printed:
//!
//! ```rust
//! use embkit::log_info;
//! use embkit::system::log::{Format, LevelFilter, Logger};
//!
//! fn uart_print(_line: &str) {
//!     // write the line to the console UART
//! }
//!
//! fn hide_prompt() {}
//! fn show_prompt() {}
//!
//! static LOGGER: Logger = Logger::new(LevelFilter::Info)
//!     .with_output_function(uart_print)
//!     .with_hooks(hide_prompt, show_prompt)
//!     .with_format(Format::Text);
//!
//! log_info!(LOGGER, "booted in {} ms", 42);
//! // * booted in 42 ms                 [main.rs:17]
//! ```
//!
//! With [`Format::Json`] the same record becomes
//! `{"level":"info","file":"main.rs","line":17,"msg":"booted in 42 ms"}`.

use core::fmt::{self, Write};
use core::str;

use heapless::String;
use serde::Serialize;

/// Bytes kept from a formatted message. Longer messages are cut.
pub const MESSAGE_CAPACITY: usize = 256;

/// Width messages are padded to in [`Format::Text`], so locations line up.
pub const MESSAGE_COLUMN: usize = 32;

const LINE_CAPACITY: usize = MESSAGE_CAPACITY + 96;
const JSON_CAPACITY: usize = 2 * MESSAGE_CAPACITY + 128;
const PADDING: &str = "                                ";

/// Severity of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Detailed tracing.
    Debug,
    /// Normal operation.
    Info,
    /// Something unexpected that the firmware recovered from.
    Warning,
    /// An operation failed.
    Error,
}

impl Level {
    /// Single character that starts a [`Format::Text`] line.
    pub const fn tag(self) -> &'static str {
        match self {
            Level::Debug => ".",
            Level::Info => "*",
            Level::Warning => "!",
            Level::Error => "?",
        }
    }
}

/// Lowest level a [`Logger`] lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelFilter {
    /// Everything.
    Debug,
    /// [`Level::Info`] and above.
    Info,
    /// [`Level::Warning`] and above.
    Warning,
    /// Only [`Level::Error`].
    Error,
    /// Nothing.
    Off,
}

impl LevelFilter {
    /// `true` if records at `level` pass.
    pub const fn allows(self, level: Level) -> bool {
        let min = match self {
            LevelFilter::Debug => Level::Debug,
            LevelFilter::Info => Level::Info,
            LevelFilter::Warning => Level::Warning,
            LevelFilter::Error => Level::Error,
            LevelFilter::Off => return false,
        };
        level as u8 >= min as u8
    }
}

/// Line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// `<tag> <message padded to 32 columns>[file:line]`
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Level {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Level::Debug => defmt::write!(f, "Debug"),
            Level::Info => defmt::write!(f, "Info"),
            Level::Warning => defmt::write!(f, "Warning"),
            Level::Error => defmt::write!(f, "Error"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LevelFilter {
    fn format(&self, f: defmt::Formatter) {
        match self {
            LevelFilter::Debug => defmt::write!(f, "Debug"),
            LevelFilter::Info => defmt::write!(f, "Info"),
            LevelFilter::Warning => defmt::write!(f, "Warning"),
            LevelFilter::Error => defmt::write!(f, "Error"),
            LevelFilter::Off => defmt::write!(f, "Off"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Format {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Format::Text => defmt::write!(f, "Text"),
            Format::Json => defmt::write!(f, "Json"),
        }
    }
}

/// Receives one complete line, `\r\n` included, per record.
pub type LogFn = fn(&str);

/// Runs before or after each emitted record.
pub type HookFn = fn();

/// Record formatter bound to one output function.
///
/// All builders are `const`, so a logger can live in a `static`.
#[derive(Debug, Clone, Copy)]
pub struct Logger {
    filter: LevelFilter,
    format: Format,
    output: Option<LogFn>,
    start_hook: Option<HookFn>,
    end_hook: Option<HookFn>,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    level: Level,
    file: &'a str,
    line: u32,
    msg: &'a str,
}

impl Logger {
    /// A text logger with no output function. Records are dropped until one
    /// is set.
    pub const fn new(filter: LevelFilter) -> Self {
        Self {
            filter,
            format: Format::Text,
            output: None,
            start_hook: None,
            end_hook: None,
        }
    }

    /// Send finished lines to `output`.
    pub const fn with_output_function(mut self, output: LogFn) -> Self {
        self.output = Some(output);
        self
    }

    /// Call `start` before and `end` after every emitted record.
    pub const fn with_hooks(mut self, start: HookFn, end: HookFn) -> Self {
        self.start_hook = Some(start);
        self.end_hook = Some(end);
        self
    }

    /// Choose the line layout.
    pub const fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Change the minimum level.
    pub fn set_filter(&mut self, filter: LevelFilter) {
        self.filter = filter;
    }

    /// Current minimum level.
    pub fn filter(&self) -> LevelFilter {
        self.filter
    }

    /// `true` if a record at `level` would be emitted.
    pub fn enabled(&self, level: Level) -> bool {
        self.output.is_some() && self.filter.allows(level)
    }

    /// Format and emit one record. Usually called through the `log_*!`
    /// macros, which fill in `file` and `line`.
    pub fn log(&self, level: Level, file: &str, line: u32, args: fmt::Arguments<'_>) {
        let Some(output) = self.output else {
            return;
        };
        if !self.filter.allows(level) {
            return;
        }

        let mut msg: String<MESSAGE_CAPACITY> = String::new();
        let _ = Truncating(&mut msg).write_fmt(args);
        let file = file_name(file);

        if let Some(start) = self.start_hook {
            start();
        }

        match self.format {
            Format::Text => emit_text(output, level, file, line, &msg),
            Format::Json => {
                let record = JsonRecord {
                    level,
                    file,
                    line,
                    msg: &msg,
                };
                let mut buf = [0u8; JSON_CAPACITY];
                match render_json(&record, &mut buf) {
                    Some(text) => output(text),
                    None => emit_text(output, level, file, line, &msg),
                }
            }
        }

        if let Some(end) = self.end_hook {
            end();
        }
    }
}

fn emit_text(output: LogFn, level: Level, file: &str, line: u32, msg: &str) {
    let pad = MESSAGE_COLUMN.saturating_sub(msg.len());
    let mut text: String<LINE_CAPACITY> = String::new();
    let _ = write!(
        Truncating(&mut text),
        "{} {}{}[{}:{}]\r\n",
        level.tag(),
        msg,
        &PADDING[..pad],
        file,
        line
    );
    output(&text);
}

fn render_json<'b>(record: &JsonRecord<'_>, buf: &'b mut [u8]) -> Option<&'b str> {
    let room = buf.len().checked_sub(2)?;
    let len = serde_json_core::to_slice(record, &mut buf[..room]).ok()?;
    buf[len..len + 2].copy_from_slice(b"\r\n");
    str::from_utf8(&buf[..len + 2]).ok()
}

/// Last path component of `file`, for either separator.
fn file_name(file: &str) -> &str {
    file.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(file)
}

/// Writes what fits and silently drops the rest.
struct Truncating<'a, const N: usize>(&'a mut String<N>);

impl<const N: usize> Write for Truncating<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = N - self.0.len();
        let mut end = s.len().min(room);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        let _ = self.0.push_str(&s[..end]);
        Ok(())
    }
}

/// Log at [`Level::Debug`](crate::system::log::Level::Debug) through the
/// given [`Logger`](crate::system::log::Logger).
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log(
            $crate::system::log::Level::Debug,
            ::core::file!(),
            ::core::line!(),
            ::core::format_args!($($arg)+),
        )
    };
}

/// Log at [`Level::Info`](crate::system::log::Level::Info) through the
/// given [`Logger`](crate::system::log::Logger).
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log(
            $crate::system::log::Level::Info,
            ::core::file!(),
            ::core::line!(),
            ::core::format_args!($($arg)+),
        )
    };
}

/// Log at [`Level::Warning`](crate::system::log::Level::Warning) through
/// the given [`Logger`](crate::system::log::Logger).
#[macro_export]
macro_rules! log_warning {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log(
            $crate::system::log::Level::Warning,
            ::core::file!(),
            ::core::line!(),
            ::core::format_args!($($arg)+),
        )
    };
}

/// Log at [`Level::Error`](crate::system::log::Level::Error) through the
/// given [`Logger`](crate::system::log::Logger).
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log(
            $crate::system::log::Level::Error,
            ::core::file!(),
            ::core::line!(),
            ::core::format_args!($($arg)+),
        )
    };
}
