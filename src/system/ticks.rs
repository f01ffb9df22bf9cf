//! Millisecond time base.
//!
//! [`Ticks`] is a counter advanced from a periodic interrupt. Anything that
//! needs the time takes a [`Clock`], so tests can supply their own.
//!
//! All arithmetic wraps: a `u32` of milliseconds rolls over after about 49
//! days and intervals stay correct across the rollover.
//!
//! # Examples
//!
//! ```rust
//! use embkit::system::ticks::{Clock, Ticks};
//!
//! static TICKS: Ticks = Ticks::new();
//!
//! // in the 1 ms SysTick handler
//! TICKS.inc_ms(1);
//!
//! let start = TICKS.now_ms();
//! TICKS.inc_ms(10);
//! assert_eq!(TICKS.elapsed_ms(start), 10);
//! assert!(TICKS.is_timeout(start, 10));
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

/// Source of the current time in milliseconds.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed point.
    fn now_ms(&self) -> u32;

    /// Milliseconds since `last`, across counter rollover.
    fn elapsed_ms(&self, last: u32) -> u32 {
        self.now_ms().wrapping_sub(last)
    }

    /// `true` once at least `interval` milliseconds have passed since
    /// `last`.
    fn is_timeout(&self, last: u32, interval: u32) -> bool {
        self.elapsed_ms(last) >= interval
    }
}

/// Free-running millisecond counter.
///
/// Reads never observe a half-written value, even on targets whose native
/// word is narrower than 32 bits.
#[derive(Debug, Default)]
pub struct Ticks {
    ms: AtomicU32,
}

impl Ticks {
    /// Counter starting at zero.
    pub const fn new() -> Self {
        Self {
            ms: AtomicU32::new(0),
        }
    }

    /// Advance by `ms`. Meant to be called from a single context, usually
    /// the tick interrupt.
    pub fn inc_ms(&self, ms: u32) {
        // single writer, so load + store is enough and works on cores
        // without atomic read-modify-write
        let now = self.ms.load(Ordering::Relaxed);
        self.ms.store(now.wrapping_add(ms), Ordering::Release);
    }
}

impl Clock for Ticks {
    fn now_ms(&self) -> u32 {
        self.ms.load(Ordering::Acquire)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}
