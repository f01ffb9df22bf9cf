//! # embkit - embedded toolkit
//!
//! Small building blocks for microcontroller firmware, all `no_std` and free
//! of heap allocation.
//!
//! ## Features
//!
//! ### Command Shell
//! - Interactive line editing over a serial terminal
//! - Command history browsed with the arrow keys
//! - Tab completion of command names
//! - Static command tables with aliases
//!
//! ### System Utilities
//! - Leveled log records in text or JSON layout
//! - Byte ring buffer for interrupt-to-task handoff
//! - Millisecond tick counter and software timers
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! embkit = "0.1.0"
//! ```
//!
//! ### Serial Console Example
//!
//! ```rust
//! use embkit::system::rbuffer::RingBuffer;
//! use embkit::system::shell::Shell;
//!
//! fn uart_write(_byte: u8) {
//!     // hand the byte to the UART
//! }
//!
//! let mut rx: RingBuffer<32> = RingBuffer::new();
//! let mut shell = Shell::default();
//! shell.set_output_function(uart_write);
//! shell.start();
//!
//! // the RX interrupt queues bytes...
//! rx.write(b"test a b\r");
//! // ...and the main loop feeds them to the shell
//! shell.drain(&mut rx);
//! assert!(rx.is_empty());
//! ```
//!
//! ## Optional Features
//!
//! - `history`: Up/Down history browsing and the `history` command (default: enabled)
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Enable defmt logging support for embedded debugging

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

// must stay first so its macros are visible everywhere below
mod fmt;

/// System utilities for embedded devices.
///
/// Contains the command shell, the log sink and the timing primitives that
/// firmware usually needs before anything application specific.
pub mod system;
