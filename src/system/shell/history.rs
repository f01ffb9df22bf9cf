//! Ring of previously submitted lines with Up/Down browsing.
//!
//! Two indices are kept apart on purpose: `write_index` is where the next
//! committed line goes, `inquire_index` is the entry currently shown while
//! the user scrolls. Scrolling never moves the write position.

use core::str;

use super::{HISTORY_DEPTH, LINE_CAPACITY, MAX_LINE_LEN};

/// Fixed-capacity command history.
#[derive(Debug, Clone)]
pub struct History {
    slots: [[u8; LINE_CAPACITY]; HISTORY_DEPTH],
    lens: [usize; HISTORY_DEPTH],
    write_index: usize,
    total: usize,
    // the live line, saved by the first Up press
    backup: [u8; LINE_CAPACITY],
    backup_len: usize,
    inquire_index: usize,
    inquire_count: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create an empty history.
    pub const fn new() -> Self {
        Self {
            slots: [[0; LINE_CAPACITY]; HISTORY_DEPTH],
            lens: [0; HISTORY_DEPTH],
            write_index: 0,
            total: 0,
            backup: [0; LINE_CAPACITY],
            backup_len: 0,
            inquire_index: 0,
            inquire_count: 0,
        }
    }

    /// Number of stored lines, at most [`HISTORY_DEPTH`].
    pub fn len(&self) -> usize {
        self.total
    }

    /// `true` when nothing has been committed yet.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of Up presses since browsing began; zero while the user edits
    /// live input.
    pub fn inquire_count(&self) -> usize {
        self.inquire_count
    }

    /// `true` while an older entry is displayed instead of live input.
    pub fn is_scrolling(&self) -> bool {
        self.inquire_count > 0
    }

    /// Stored line by age, `0` being the most recent.
    pub fn get(&self, age: usize) -> Option<&str> {
        if age >= self.total {
            return None;
        }
        let index = (self.write_index + HISTORY_DEPTH - 1 - age) % HISTORY_DEPTH;
        Some(self.slot(index))
    }

    /// Stored lines, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        (0..self.total).filter_map(move |age| self.get(age))
    }

    /// Record a submitted line. Empty lines are not recorded.
    pub fn commit(&mut self, line: &[u8]) {
        if line.is_empty() {
            return;
        }

        let len = line.len().min(MAX_LINE_LEN);
        let slot = &mut self.slots[self.write_index];
        slot.fill(0);
        slot[..len].copy_from_slice(&line[..len]);
        self.lens[self.write_index] = len;

        self.write_index = (self.write_index + 1) % HISTORY_DEPTH;
        self.total = (self.total + 1).min(HISTORY_DEPTH);
    }

    /// Drop back to live input. The next Up saves a fresh backup.
    pub(crate) fn end_browse(&mut self) {
        self.inquire_count = 0;
        self.inquire_index = 0;
    }

    /// Step one entry back in time (Up).
    ///
    /// `current` is saved on the first step so [`newer`](Self::newer) can
    /// bring it back. Returns `None` when there is nothing older to show.
    pub(crate) fn older(&mut self, current: &[u8]) -> Option<&[u8]> {
        if self.total == 0 {
            return None;
        }

        if self.inquire_count == 0 {
            let len = current.len().min(MAX_LINE_LEN);
            self.backup.fill(0);
            self.backup[..len].copy_from_slice(&current[..len]);
            self.backup_len = len;
            self.inquire_index = self.write_index;
        }

        if self.inquire_count >= self.total {
            return None;
        }

        self.inquire_index = if self.inquire_index == 0 {
            HISTORY_DEPTH - 1
        } else {
            self.inquire_index - 1
        };
        self.inquire_count += 1;

        Some(&self.slots[self.inquire_index][..self.lens[self.inquire_index]])
    }

    /// Step one entry forward in time (Down). Leaving the newest entry
    /// returns the saved live line. Returns `None` when not browsing.
    pub(crate) fn newer(&mut self) -> Option<&[u8]> {
        if self.total == 0 || self.inquire_count == 0 {
            return None;
        }

        self.inquire_count -= 1;
        if self.inquire_count == 0 {
            return Some(&self.backup[..self.backup_len]);
        }

        self.inquire_index = (self.inquire_index + 1) % HISTORY_DEPTH;
        Some(&self.slots[self.inquire_index][..self.lens[self.inquire_index]])
    }

    fn slot(&self, index: usize) -> &str {
        str::from_utf8(&self.slots[index][..self.lens[index]]).unwrap_or_default()
    }
}
