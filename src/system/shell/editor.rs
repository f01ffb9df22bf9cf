//! In-place line editing with minimal terminal redraw.
//!
//! The terminal is only assumed to understand backspace as "cursor one column
//! left", so every edit in the middle of the line reprints the tail and walks
//! the cursor back with backspaces.

use core::str;

use super::output::Output;
use super::{ASCII_BACKSPACE, LINE_CAPACITY, MAX_LINE_LEN};

/// The line being typed: fixed buffer, logical length and cursor.
///
/// Bytes at and beyond `count` are always zero, so the buffer doubles as a
/// NUL-terminated string.
#[derive(Debug, Clone)]
pub struct LineEditor {
    buf: [u8; LINE_CAPACITY],
    count: usize,
    cursor: usize,
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl LineEditor {
    /// Create an empty line.
    pub const fn new() -> Self {
        Self {
            buf: [0; LINE_CAPACITY],
            count: 0,
            cursor: 0,
        }
    }

    /// Typed characters.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.count]
    }

    /// Typed characters as text. Only printable ASCII is ever stored.
    pub fn as_str(&self) -> &str {
        str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    /// Number of typed characters.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Insertion point, `0..=count`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// `true` when nothing has been typed.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// `true` when no further character fits.
    pub fn is_full(&self) -> bool {
        self.count >= MAX_LINE_LEN
    }

    /// Insert `ch` at the cursor. Ignored when the line is full.
    pub(crate) fn insert(&mut self, ch: u8, out: &Output) {
        if self.is_full() {
            return;
        }

        if self.cursor == self.count {
            self.buf[self.cursor] = ch;
            self.cursor += 1;
            self.count += 1;
            out.put_char(ch);
            return;
        }

        self.buf.copy_within(self.cursor..self.count, self.cursor + 1);
        self.buf[self.cursor] = ch;
        self.cursor += 1;
        self.count += 1;

        out.put_char(ch);
        out.put_bytes(&self.buf[self.cursor..self.count]);
        out.backspaces(self.count - self.cursor);
    }

    /// Delete the character left of the cursor. Ignored at column zero.
    pub(crate) fn backspace(&mut self, out: &Output) {
        if self.cursor == 0 {
            return;
        }

        self.cursor -= 1;
        self.count -= 1;

        if self.cursor == self.count {
            self.buf[self.count] = 0;
            out.rub_out(1);
            return;
        }

        self.buf.copy_within(self.cursor + 1..self.count + 1, self.cursor);
        self.buf[self.count] = 0;

        out.put_char(ASCII_BACKSPACE);
        out.put_bytes(&self.buf[self.cursor..self.count]);
        // blank the glyph left over from the old last column
        out.put_str(" \x08");
        out.backspaces(self.count - self.cursor);
    }

    pub(crate) fn move_left(&mut self, out: &Output) {
        if self.cursor > 0 {
            out.put_char(ASCII_BACKSPACE);
            self.cursor -= 1;
        }
    }

    pub(crate) fn move_right(&mut self, out: &Output) {
        if self.cursor < self.count {
            out.put_char(self.buf[self.cursor]);
            self.cursor += 1;
        }
    }

    /// Place the cursor after the last character without touching the
    /// display.
    pub(crate) fn cursor_to_end(&mut self) {
        self.cursor = self.count;
    }

    /// Replace the whole line, truncating to the line capacity. The cursor
    /// lands at the end.
    pub(crate) fn replace(&mut self, content: &[u8]) {
        let len = content.len().min(MAX_LINE_LEN);
        self.buf.fill(0);
        self.buf[..len].copy_from_slice(&content[..len]);
        self.count = len;
        self.cursor = len;
    }

    pub(crate) fn clear(&mut self) {
        self.buf.fill(0);
        self.count = 0;
        self.cursor = 0;
    }

    /// Wipe the typed text from the display, leaving the terminal cursor
    /// right after the prompt.
    pub(crate) fn erase_display(&self, out: &Output) {
        out.spaces(self.count - self.cursor);
        out.rub_out(self.count);
    }

    /// Print the line and walk the terminal cursor back to `cursor`.
    pub(crate) fn redraw(&self, out: &Output) {
        out.put_bytes(self.as_bytes());
        out.backspaces(self.count - self.cursor);
    }
}
