//! Byte sink shared by the editor, completion and command handlers.

use core::fmt;

use super::{ASCII_BACKSPACE, OutputFn};

/// Erases the character left of the terminal cursor.
const RUB_OUT: &str = "\x08 \x08";

/// Thin wrapper around the optional output function.
///
/// Every write is a no-op while no function is bound.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Output {
    sink: Option<OutputFn>,
}

impl Output {
    pub(crate) const fn new() -> Self {
        Self { sink: None }
    }

    pub(crate) fn bind(&mut self, sink: OutputFn) {
        self.sink = Some(sink);
    }

    pub(crate) fn put_char(&self, byte: u8) {
        if let Some(sink) = self.sink {
            sink(byte);
        }
    }

    pub(crate) fn put_bytes(&self, bytes: &[u8]) {
        for &byte in bytes {
            self.put_char(byte);
        }
    }

    pub(crate) fn put_str(&self, text: &str) {
        self.put_bytes(text.as_bytes());
    }

    /// Moves the terminal cursor `n` columns left without erasing.
    pub(crate) fn backspaces(&self, n: usize) {
        for _ in 0..n {
            self.put_char(ASCII_BACKSPACE);
        }
    }

    /// Erases `n` characters left of the terminal cursor.
    pub(crate) fn rub_out(&self, n: usize) {
        for _ in 0..n {
            self.put_str(RUB_OUT);
        }
    }

    pub(crate) fn spaces(&self, n: usize) {
        for _ in 0..n {
            self.put_char(b' ');
        }
    }
}

impl fmt::Write for Output {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.put_str(s);
        Ok(())
    }
}
