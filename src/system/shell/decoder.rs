//! Raw byte classification.
//!
//! Terminals send arrow keys as the three-byte sequence `ESC [ <dir>`. The
//! decoder keeps just enough state to recognise that lead-in and turns every
//! other byte into exactly one [`Action`].

use super::{ASCII_BACKSPACE, ASCII_CR, ASCII_DEL, ASCII_ESC, ASCII_LF, ASCII_TAB};

/// Lead-in byte following `ESC` in a cursor key sequence.
const CSI_BRACKET: u8 = b'[';

/// Progress through an escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderState {
    /// Not inside an escape sequence.
    #[default]
    Normal,
    /// `ESC` received, waiting for `[`.
    SawEscape,
    /// `ESC [` received, waiting for the direction byte.
    SawBracket,
}

/// What a single input byte means to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing to do: filtered, unknown control, or a byte that broke an
    /// escape sequence.
    Ignore,
    /// Horizontal tab, triggers command name completion.
    Tab,
    /// Backspace (`0x08`) or delete (`0x7F`).
    Backspace,
    /// Carriage return or line feed.
    Enter,
    /// Cursor left (`ESC [ D`).
    Left,
    /// Cursor right (`ESC [ C`).
    Right,
    /// Cursor up (`ESC [ A`).
    Up,
    /// Cursor down (`ESC [ B`).
    Down,
    /// A printable ASCII character in `' '..='~'`.
    Printable(u8),
    /// Part of an escape sequence was consumed.
    SequenceInProgress,
}

/// Three-state classifier for the shell input stream.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    state: DecoderState,
}

impl Decoder {
    /// Create a decoder in the [`DecoderState::Normal`] state.
    pub const fn new() -> Self {
        Self {
            state: DecoderState::Normal,
        }
    }

    /// Current escape sequence state.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Classify one byte, advancing the escape sequence state.
    ///
    /// `0x00` and `0xFF` are line noise and never change state. `ESC` always
    /// (re)starts a sequence. A byte that does not continue a started
    /// sequence is swallowed rather than reinterpreted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use embkit::system::shell::{Action, Decoder};
    ///
    /// let mut decoder = Decoder::new();
    /// assert_eq!(decoder.classify(0x1B), Action::SequenceInProgress);
    /// assert_eq!(decoder.classify(b'['), Action::SequenceInProgress);
    /// assert_eq!(decoder.classify(b'A'), Action::Up);
    /// assert_eq!(decoder.classify(b'A'), Action::Printable(b'A'));
    /// ```
    pub fn classify(&mut self, byte: u8) -> Action {
        if byte == 0x00 || byte == 0xFF {
            return Action::Ignore;
        }

        if byte == ASCII_ESC {
            self.state = DecoderState::SawEscape;
            return Action::SequenceInProgress;
        }

        match self.state {
            DecoderState::SawEscape => {
                if byte == CSI_BRACKET {
                    self.state = DecoderState::SawBracket;
                    Action::SequenceInProgress
                } else {
                    self.state = DecoderState::Normal;
                    Action::Ignore
                }
            }
            DecoderState::SawBracket => {
                self.state = DecoderState::Normal;
                match byte {
                    b'A' => Action::Up,
                    b'B' => Action::Down,
                    b'C' => Action::Right,
                    b'D' => Action::Left,
                    _ => Action::Ignore,
                }
            }
            DecoderState::Normal => classify_plain(byte),
        }
    }
}

/// Byte classes outside an escape sequence. The classes are disjoint, so
/// the order of the arms carries no meaning.
fn classify_plain(byte: u8) -> Action {
    match byte {
        ASCII_TAB => Action::Tab,
        ASCII_BACKSPACE | ASCII_DEL => Action::Backspace,
        ASCII_CR | ASCII_LF => Action::Enter,
        b' '..=b'~' => Action::Printable(byte),
        _ => Action::Ignore,
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DecoderState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            DecoderState::Normal => defmt::write!(f, "Normal"),
            DecoderState::SawEscape => defmt::write!(f, "SawEscape"),
            DecoderState::SawBracket => defmt::write!(f, "SawBracket"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Action {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Action::Ignore => defmt::write!(f, "Ignore"),
            Action::Tab => defmt::write!(f, "Tab"),
            Action::Backspace => defmt::write!(f, "Backspace"),
            Action::Enter => defmt::write!(f, "Enter"),
            Action::Left => defmt::write!(f, "Left"),
            Action::Right => defmt::write!(f, "Right"),
            Action::Up => defmt::write!(f, "Up"),
            Action::Down => defmt::write!(f, "Down"),
            Action::Printable(byte) => defmt::write!(f, "Printable({=u8})", byte),
            Action::SequenceInProgress => defmt::write!(f, "SequenceInProgress"),
        }
    }
}
