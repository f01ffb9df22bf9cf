//! Fixed-capacity byte FIFO.
//!
//! Typical use is an RX interrupt writing bytes and the main loop reading
//! them, for example with [`Shell::drain`](crate::system::shell::Shell::drain).
//! The buffer itself is not synchronized; share it through whatever critical
//! section primitive the target provides.
//!
//! # Examples
//!
//! ```rust
//! use embkit::system::rbuffer::RingBuffer;
//!
//! let mut rx: RingBuffer<8> = RingBuffer::new();
//! assert_eq!(rx.write(b"hello world"), 8);
//! assert!(rx.is_full());
//!
//! let mut buf = [0u8; 5];
//! assert_eq!(rx.read(&mut buf), 5);
//! assert_eq!(&buf, b"hello");
//! assert_eq!(rx.len(), 3);
//! ```

use heapless::Deque;

/// Byte queue holding at most `N` bytes.
#[derive(Debug, Clone)]
pub struct RingBuffer<const N: usize> {
    queue: Deque<u8, N>,
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RingBuffer<N> {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
        }
    }

    /// Append one byte. Returns `false` when the buffer is full.
    pub fn write_byte(&mut self, byte: u8) -> bool {
        self.queue.push_back(byte).is_ok()
    }

    /// Take the oldest byte.
    pub fn read_byte(&mut self) -> Option<u8> {
        self.queue.pop_front()
    }

    /// Append as many bytes of `data` as fit, returning how many were taken.
    pub fn write(&mut self, data: &[u8]) -> usize {
        let mut written = 0;
        for &byte in data {
            if !self.write_byte(byte) {
                break;
            }
            written += 1;
        }
        written
    }

    /// Move up to `buf.len()` of the oldest bytes into `buf`, returning how
    /// many were moved.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut read = 0;
        for slot in buf.iter_mut() {
            match self.queue.pop_front() {
                Some(byte) => {
                    *slot = byte;
                    read += 1;
                }
                None => break,
            }
        }
        read
    }

    /// Oldest byte, left in place.
    pub fn peek(&self) -> Option<u8> {
        self.queue.front().copied()
    }

    /// Number of queued bytes.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// `true` when no byte is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// `true` when no further byte fits.
    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    /// Total number of bytes the buffer can hold.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Drop every queued byte.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
