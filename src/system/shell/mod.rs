//! Interactive command shell for a serial terminal.
//!
//! The shell turns a raw stream of bytes into edited command lines and runs
//! the matching handler. Everything lives in fixed-size buffers inside one
//! [`Shell`] value; nothing is allocated.
//!
//! # Features
//!
//! - **Line editing**: insert and delete anywhere in the line, cursor keys
//!   move left and right, redraw uses backspaces only
//! - **History**: Up/Down browse the last [`HISTORY_DEPTH`] lines (feature
//!   `history`, on by default)
//! - **Completion**: Tab completes a unique command name or lists every
//!   candidate
//! - **Static registry**: commands and one-hop aliases in `'static` tables
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   Decoder       │───▶│   LineEditor    │───▶│   Dispatcher    │
//! │   (bytes to     │    │   (buffer,      │    │   (tokenize,    │
//! │   actions)      │    │   cursor)       │    │   lookup, run)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!                               │   ▲                   │
//!                               ▼   │                   ▼
//!                        ┌─────────────────┐    ┌─────────────────┐
//!                        │   History /     │    │   Registry      │
//!                        │   Completion    │───▶│   (static       │
//!                        │                 │    │   tables)       │
//!                        └─────────────────┘    └─────────────────┘
//! ```
//!
//! # Usage Examples
//!
//! ```rust
//! use embkit::system::shell::{Command, CommandEntry, Context, Registry, Shell, ShellResult};
//!
//! fn led(ctx: &mut Context<'_>, _argc: usize, argv: &[&str]) -> ShellResult {
//!     match argv {
//!         [_, "on"] => ctx.put_str("led on\r\n"),
//!         [_, "off"] => ctx.put_str("led off\r\n"),
//!         _ => return ShellResult::InvalidParameter,
//!     }
//!     ShellResult::Ok
//! }
//!
//! fn uart_write(_byte: u8) {
//!     // push the byte to the UART TX register
//! }
//!
//! static COMMANDS: [CommandEntry; 1] = [CommandEntry::Command(Command {
//!     name: "led",
//!     usage: "led <on|off> -- switch the status led",
//!     handler: led,
//! })];
//!
//! let registry = Registry::with_builtins(&COMMANDS).unwrap();
//! let mut shell = Shell::new(registry);
//! shell.set_output_function(uart_write);
//! shell.start();
//!
//! // bytes as they arrive from the UART
//! shell.input(b"led on\r");
//! assert_eq!(shell.count(), 0);
//! ```

mod builtins;
mod completion;
mod decoder;
mod editor;
#[cfg(feature = "history")]
mod history;
mod output;
mod registry;

use core::fmt;
use core::ops::Range;

use heapless::Vec;

use crate::system::rbuffer::RingBuffer;

pub use decoder::{Action, Decoder, DecoderState};
pub(crate) use editor::LineEditor;
#[cfg(feature = "history")]
pub use history::History;
pub use registry::{Command, CommandEntry, CommandFn, Lookup, Registry};

use completion::Completion;
use output::Output;

/// Size of the line buffer, including the terminator slot.
pub const LINE_CAPACITY: usize = 64;

/// Maximum number of characters a line can hold.
pub const MAX_LINE_LEN: usize = LINE_CAPACITY - 1;

/// Maximum number of tokens per line, the command name included.
///
/// A line with more tokens is reported and not run.
pub const MAX_ARGS: usize = 5;

/// Number of submitted lines kept for Up/Down browsing.
pub const HISTORY_DEPTH: usize = 10;

/// Prompt used until [`Shell::set_prompt`] installs another one.
pub const DEFAULT_PROMPT: &str = "[CLI] > ";

// ASCII control character constants for input processing
/// ASCII backspace character (0x08).
pub const ASCII_BACKSPACE: u8 = 0x08;
/// ASCII horizontal tab character (0x09).
pub const ASCII_TAB: u8 = 0x09;
/// ASCII line feed character (0x0A).
pub const ASCII_LF: u8 = 0x0A;
/// ASCII carriage return character (0x0D).
pub const ASCII_CR: u8 = 0x0D;
/// ASCII escape character (0x1B).
pub const ASCII_ESC: u8 = 0x1B;
/// ASCII delete character (0x7F).
pub const ASCII_DEL: u8 = 0x7F;
/// ASCII space character (0x20).
pub const ASCII_SPACE: u8 = 0x20;

/// Result type for shell operations and command handlers.
///
/// # Examples
///
/// ```rust
/// use embkit::system::shell::{Context, ShellResult};
///
/// fn example_command(_ctx: &mut Context<'_>, argc: usize, argv: &[&str]) -> ShellResult {
///     if argc < 2 {
///         return ShellResult::InvalidParameter;
///     }
///
///     if argv[1] == "error" {
///         return ShellResult::OutOfMemory;
///     }
///
///     ShellResult::Ok
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellResult {
    /// Operation completed successfully.
    Ok,
    /// Invalid parameter was provided to a command or shell operation.
    InvalidParameter,
    /// Insufficient memory to complete the operation.
    OutOfMemory,
    /// Input did not fit in the line buffer.
    BufferOverflow,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ShellResult {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ShellResult::Ok => defmt::write!(f, "Ok"),
            ShellResult::InvalidParameter => defmt::write!(f, "InvalidParameter"),
            ShellResult::OutOfMemory => defmt::write!(f, "OutOfMemory"),
            ShellResult::BufferOverflow => defmt::write!(f, "BufferOverflow"),
        }
    }
}

/// Function signature for the output sink.
///
/// Called once per byte the shell wants to show on the terminal.
///
/// # Examples
///
/// ```rust
/// use embkit::system::shell::OutputFn;
///
/// let uart_output: OutputFn = |byte| {
///     // write `byte` to the UART data register
///     let _ = byte;
/// };
/// ```
pub type OutputFn = fn(u8);

/// What a command handler can see of the running shell.
///
/// Output written here goes to the same sink as the echo, so a handler's
/// text appears between the submitted line and the next prompt.
#[derive(Debug)]
pub struct Context<'a> {
    output: Output,
    registry: &'a Registry,
    #[cfg(feature = "history")]
    history: &'a History,
}

impl<'a> Context<'a> {
    /// Write one byte to the terminal.
    pub fn put_char(&mut self, byte: u8) {
        self.output.put_char(byte);
    }

    /// Write a string to the terminal.
    pub fn put_str(&mut self, text: &str) {
        self.output.put_str(text);
    }

    /// The registry the shell dispatches from.
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Previously submitted lines. The line being run is already the newest
    /// entry.
    #[cfg(feature = "history")]
    pub fn history(&self) -> &'a History {
        self.history
    }
}

impl fmt::Write for Context<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.output.put_str(s);
        Ok(())
    }
}

/// One interactive session: line buffer, cursor, decoder state, history,
/// prompt and output sink.
///
/// Feed it bytes with [`Shell::input`] or [`Shell::feed_byte`] from a single
/// context. Handlers run synchronously inside the call that delivered the
/// Enter key.
///
/// # Examples
///
/// ```rust
/// use embkit::system::shell::{Shell, ShellResult};
///
/// let mut shell = Shell::default();
/// assert_eq!(shell.set_output_function(|_byte| {}), ShellResult::Ok);
///
/// shell.input(b"hel\t");
/// assert_eq!(shell.line(), "help");
/// ```
#[derive(Debug, Clone)]
pub struct Shell {
    editor: LineEditor,
    decoder: Decoder,
    output: Output,
    prompt: &'static str,
    registry: Registry,
    #[cfg(feature = "history")]
    history: History,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new(Registry::builtins())
    }
}

impl Shell {
    /// Create a shell dispatching from `registry`.
    ///
    /// The line is empty, the prompt is [`DEFAULT_PROMPT`] and no output
    /// function is bound, so nothing is printed until
    /// [`set_output_function`](Self::set_output_function) is called.
    pub const fn new(registry: Registry) -> Self {
        Self {
            editor: LineEditor::new(),
            decoder: Decoder::new(),
            output: Output::new(),
            prompt: DEFAULT_PROMPT,
            registry,
            #[cfg(feature = "history")]
            history: History::new(),
        }
    }

    /// Set the function that receives every output byte.
    pub fn set_output_function(&mut self, output_fn: OutputFn) -> ShellResult {
        self.output.bind(output_fn);
        ShellResult::Ok
    }

    /// Replace the prompt. `None` restores [`DEFAULT_PROMPT`].
    pub fn set_prompt(&mut self, prompt: Option<&'static str>) {
        self.prompt = prompt.unwrap_or(DEFAULT_PROMPT);
    }

    /// Current prompt.
    pub fn prompt(&self) -> &'static str {
        self.prompt
    }

    /// The registry commands are looked up in.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Text typed so far.
    pub fn line(&self) -> &str {
        self.editor.as_str()
    }

    /// Number of characters in the line.
    pub fn count(&self) -> usize {
        self.editor.count()
    }

    /// Cursor position within the line.
    pub fn cursor(&self) -> usize {
        self.editor.cursor()
    }

    /// Escape sequence progress of the input decoder.
    pub fn decoder_state(&self) -> DecoderState {
        self.decoder.state()
    }

    /// Previously submitted lines.
    #[cfg(feature = "history")]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Print a fresh line and the prompt.
    pub fn start(&self) {
        self.output.put_str("\r\n");
        self.output.put_str(self.prompt);
    }

    /// Feed a chunk of received bytes.
    ///
    /// Every byte is processed. Returns [`ShellResult::BufferOverflow`] if
    /// any printable character was dropped because the line was full.
    pub fn input(&mut self, bytes: &[u8]) -> ShellResult {
        let mut result = ShellResult::Ok;
        for &byte in bytes {
            if self.feed_byte(byte) != ShellResult::Ok {
                result = ShellResult::BufferOverflow;
            }
        }
        result
    }

    /// Move every queued byte from `rx` into the shell.
    ///
    /// Lets an interrupt handler only enqueue received bytes while the main
    /// loop does the editing and runs the commands.
    pub fn drain<const N: usize>(&mut self, rx: &mut RingBuffer<N>) -> ShellResult {
        let mut result = ShellResult::Ok;
        while let Some(byte) = rx.read_byte() {
            if self.feed_byte(byte) != ShellResult::Ok {
                result = ShellResult::BufferOverflow;
            }
        }
        result
    }

    /// Process one received byte.
    ///
    /// Returns [`ShellResult::BufferOverflow`] when a printable character
    /// was dropped because the line is full, [`ShellResult::Ok`] otherwise.
    pub fn feed_byte(&mut self, byte: u8) -> ShellResult {
        match self.decoder.classify(byte) {
            Action::Tab => self.complete(),
            Action::Backspace => self.editor.backspace(&self.output),
            Action::Enter => self.submit(),
            Action::Left => self.editor.move_left(&self.output),
            Action::Right => self.editor.move_right(&self.output),
            #[cfg(feature = "history")]
            Action::Up => self.history_older(),
            #[cfg(feature = "history")]
            Action::Down => self.history_newer(),
            Action::Printable(ch) => {
                if self.editor.is_full() {
                    debug!("line full, dropped {}", ch);
                    return ShellResult::BufferOverflow;
                }
                self.editor.insert(ch, &self.output);
            }
            _ => {}
        }
        ShellResult::Ok
    }

    /// Erase the prompt and the typed text left of the cursor so other
    /// output can be printed on a clean line.
    pub fn suspend(&self) {
        self.output.rub_out(self.editor.cursor() + self.prompt.len());
    }

    /// Reprint the prompt and the line, cursor back in place.
    pub fn resume(&self) {
        self.output.put_str(self.prompt);
        self.editor.redraw(&self.output);
    }

    /// Repaint the prompt and the line from scratch.
    pub fn clear_and_prompt(&self) {
        self.suspend();
        self.resume();
    }

    fn complete(&mut self) {
        match completion::complete(self.editor.as_str(), &self.registry, &self.output) {
            Completion::None => {}
            Completion::Unique(name) => {
                self.editor.erase_display(&self.output);
                self.editor.replace(name.as_bytes());
                self.editor.redraw(&self.output);
            }
            Completion::Multiple => {
                self.output.put_str(self.prompt);
                self.editor.cursor_to_end();
                self.editor.redraw(&self.output);
            }
        }
    }

    #[cfg(feature = "history")]
    fn history_older(&mut self) {
        let Some(entry) = self.history.older(self.editor.as_bytes()) else {
            return;
        };
        self.editor.erase_display(&self.output);
        self.editor.replace(entry);
        self.editor.redraw(&self.output);
    }

    #[cfg(feature = "history")]
    fn history_newer(&mut self) {
        let Some(entry) = self.history.newer() else {
            return;
        };
        self.editor.erase_display(&self.output);
        self.editor.replace(entry);
        self.editor.redraw(&self.output);
    }

    fn submit(&mut self) {
        self.output.put_str("\r\n");

        if !self.editor.is_empty() {
            #[cfg(feature = "history")]
            self.history.commit(self.editor.as_bytes());
            self.dispatch();
        }

        #[cfg(feature = "history")]
        self.history.end_browse();

        self.output.put_str(self.prompt);
        self.editor.clear();
    }

    fn dispatch(&self) {
        let line = self.editor.as_str();
        let tokens = tokenize(line);
        let argv: Vec<&str, MAX_ARGS> = tokens.ranges.iter().map(|r| &line[r.clone()]).collect();

        if tokens.overflow {
            debug!("rejected line with more than {} tokens", MAX_ARGS);
            let mut out = self.output;
            let _ = fmt::Write::write_fmt(
                &mut out,
                format_args!("Too many args (max {}):\r\n  < ", MAX_ARGS),
            );
            for arg in &argv {
                out.put_str(arg);
                out.put_char(ASCII_SPACE);
            }
            out.put_str(">\r\n");
            return;
        }

        let Some(&name) = argv.first() else {
            return;
        };

        let Some(lookup) = self.registry.find(name) else {
            debug!("unknown command {}", name);
            self.output.put_str("Not found command \"");
            self.output.put_str(name);
            self.output.put_str("\"\r\n");
            return;
        };

        let mut ctx = Context {
            output: self.output,
            registry: &self.registry,
            #[cfg(feature = "history")]
            history: &self.history,
        };
        let result = (lookup.command.handler)(&mut ctx, argv.len(), &argv);
        if result != ShellResult::Ok {
            warn!("command {} returned {:?}", lookup.command.name, result);
        }
    }
}

/// Token positions within a line.
#[derive(Debug, Default)]
struct Tokens {
    ranges: Vec<Range<usize>, MAX_ARGS>,
    overflow: bool,
}

/// Split `line` on runs of spaces into at most [`MAX_ARGS`] tokens.
fn tokenize(line: &str) -> Tokens {
    let mut tokens = Tokens::default();
    let bytes = line.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        while i < bytes.len() && bytes[i] == ASCII_SPACE {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        let start = i;
        while i < bytes.len() && bytes[i] != ASCII_SPACE {
            i += 1;
        }
        if tokens.ranges.push(start..i).is_err() {
            tokens.overflow = true;
            break;
        }
    }

    tokens
}
