//! System utilities for embedded devices.
//!
//! This module provides the pieces an embedded firmware typically wires up
//! around its console: an interactive shell, a log sink, a byte queue for the
//! UART and a time base with software timers.
//!
//! # Available Utilities
//!
//! - **[`shell`]**: Line-editing command shell with history and completion
//! - **[`log`]**: Leveled log records with file and line
//! - **[`rbuffer`]**: Fixed-capacity byte FIFO
//! - **[`ticks`]**: Millisecond counter and the [`ticks::Clock`] trait
//! - **[`timer`]**: Software timers polled against a clock
//!
//! # Design Principles
//!
//! - **Embedded-First**: All utilities are designed for resource-constrained environments
//! - **Zero-Allocation**: Fixed-size buffers and stack-based operations
//! - **No globals**: every utility is a value the firmware owns and places
//!   where it likes
//!
//! # Usage
//!
//! ```rust
//! use embkit::system::shell::{Shell, ShellResult};
//! use embkit::system::ticks::Ticks;
//! use embkit::system::timer::{Repeat, Timer, TimerList};
//!
//! fn heartbeat(timer: &mut Timer<u32>) {
//!     timer.data += 1;
//! }
//!
//! let ticks = Ticks::new();
//! let mut timers: TimerList<u32, 4> = TimerList::new();
//! let id = timers.add(Timer::new(1000, Repeat::Forever, heartbeat, 0)).unwrap();
//! timers.start(id, &ticks).unwrap();
//!
//! let mut shell = Shell::default();
//! assert_eq!(shell.set_output_function(|_byte| {}), ShellResult::Ok);
//!
//! ticks.inc_ms(1000);
//! assert_eq!(timers.poll(&ticks), 1);
//! ```

pub mod error;
pub mod log;
pub mod rbuffer;
/// Interactive command shell.
///
/// Provides line editing, history, completion and dispatch of commands from
/// static tables.
pub mod shell;
pub mod ticks;
pub mod timer;
