//! Software timers polled from the main loop.
//!
//! A [`TimerList`] holds up to `N` timers in a fixed table. Calling
//! [`TimerList::poll`] regularly fires every running timer whose interval has
//! elapsed on the supplied [`Clock`]. Callbacks only get their own timer, so
//! the list cannot change while it is being walked.
//!
//! # Examples
//!
//! ```rust
//! use embkit::system::ticks::Ticks;
//! use embkit::system::timer::{Repeat, Timer, TimerList};
//!
//! fn blink(timer: &mut Timer<u32>) {
//!     timer.data += 1;
//! }
//!
//! let ticks = Ticks::new();
//! let mut timers: TimerList<u32, 4> = TimerList::new();
//!
//! let led = timers.add(Timer::new(500, Repeat::Times(2), blink, 0)).unwrap();
//! timers.start(led, &ticks).unwrap();
//!
//! for _ in 0..3 {
//!     ticks.inc_ms(500);
//!     timers.poll(&ticks);
//! }
//! assert_eq!(timers.get(led).unwrap().data, 2);
//! ```

use core::array;

use heapless::Vec;

use super::error::Error;
use super::ticks::Clock;

/// Timer callback, invoked with the timer that expired.
pub type TimerFn<T> = fn(&mut Timer<T>);

/// How many more times a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Fire on every interval until stopped.
    Forever,
    /// Fire this many more times.
    Times(u32),
}

impl Repeat {
    /// `true` once a finite repeat count is used up.
    pub fn is_done(&self) -> bool {
        matches!(self, Repeat::Times(0))
    }

    fn consume(&mut self) {
        if let Repeat::Times(n) = self {
            *n = n.saturating_sub(1);
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Repeat {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Repeat::Forever => defmt::write!(f, "Forever"),
            Repeat::Times(n) => defmt::write!(f, "Times({=u32})", n),
        }
    }
}

/// One software timer.
#[derive(Debug, Clone)]
pub struct Timer<T> {
    /// Milliseconds between two firings.
    pub interval: u32,
    /// Remaining firings.
    pub repeat: Repeat,
    /// User data handed to the callback along with the timer.
    pub data: T,
    callback: TimerFn<T>,
    running: bool,
    last: u32,
}

impl<T> Timer<T> {
    /// Create a stopped timer.
    pub fn new(interval: u32, repeat: Repeat, callback: TimerFn<T>, data: T) -> Self {
        Self {
            interval,
            repeat,
            data,
            callback,
            running: false,
            last: 0,
        }
    }

    /// `true` between start and stop.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Timestamp the next expiry is measured from.
    pub fn last_ms(&self) -> u32 {
        self.last
    }

    /// Stop the timer. Callbacks may call this on their own timer.
    pub fn stop(&mut self) {
        self.running = false;
    }
}

/// Handle to a timer in a [`TimerList`].
///
/// A handle goes stale once its timer is removed, even if the slot is later
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerId {
    index: usize,
    generation: u32,
}

/// Fixed table of up to `N` timers.
#[derive(Debug)]
pub struct TimerList<T, const N: usize> {
    slots: [Option<Timer<T>>; N],
    generations: [u32; N],
    // slot indices, oldest first
    order: Vec<usize, N>,
}

impl<T, const N: usize> Default for TimerList<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> TimerList<T, N> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            slots: array::from_fn(|_| None),
            generations: [0; N],
            order: Vec::new(),
        }
    }

    /// Number of timers in the list.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// `true` when the list holds no timer.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Add a stopped timer. The newest timer is polled first.
    ///
    /// # Errors
    ///
    /// [`Error::Full`] when all `N` slots are taken.
    pub fn add(&mut self, timer: Timer<T>) -> Result<TimerId, Error> {
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(Error::Full)?;
        self.order.push(index).map_err(|_| Error::Full)?;

        self.slots[index] = Some(timer);
        self.generations[index] = self.generations[index].wrapping_add(1);
        Ok(TimerId {
            index,
            generation: self.generations[index],
        })
    }

    /// Take a timer out of the list.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for a stale handle.
    pub fn remove(&mut self, id: TimerId) -> Result<Timer<T>, Error> {
        self.check(id)?;
        self.order.retain(|&index| index != id.index);
        self.slots[id.index].take().ok_or(Error::NotFound)
    }

    /// Drop every timer. All handles become stale.
    pub fn remove_all(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.order.clear();
    }

    /// Start a timer, measuring its first interval from now.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for a stale handle.
    pub fn start<C: Clock>(&mut self, id: TimerId, clock: &C) -> Result<(), Error> {
        let timer = self.get_mut(id)?;
        timer.running = true;
        timer.last = clock.now_ms();
        Ok(())
    }

    /// Stop a timer. It keeps its place in the list.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for a stale handle.
    pub fn stop(&mut self, id: TimerId) -> Result<(), Error> {
        self.get_mut(id)?.stop();
        Ok(())
    }

    /// Look up a timer.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for a stale handle.
    pub fn get(&self, id: TimerId) -> Result<&Timer<T>, Error> {
        self.check(id)?;
        self.slots[id.index].as_ref().ok_or(Error::NotFound)
    }

    /// Look up a timer for modification.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for a stale handle.
    pub fn get_mut(&mut self, id: TimerId) -> Result<&mut Timer<T>, Error> {
        self.check(id)?;
        self.slots[id.index].as_mut().ok_or(Error::NotFound)
    }

    /// Fire every running timer that is due, newest first, and return how
    /// many fired.
    ///
    /// Each timer fires at most once per call. Its reference point advances
    /// by exactly one interval, so a late poll does not shift later
    /// firings.
    pub fn poll<C: Clock>(&mut self, clock: &C) -> usize {
        let mut fired = 0;

        for &index in self.order.iter().rev() {
            let Some(timer) = self.slots[index].as_mut() else {
                continue;
            };
            if !timer.running || timer.repeat.is_done() {
                continue;
            }
            if !clock.is_timeout(timer.last, timer.interval) {
                continue;
            }

            timer.repeat.consume();
            timer.last = timer.last.wrapping_add(timer.interval);
            (timer.callback)(timer);
            fired += 1;
        }

        fired
    }

    fn check(&self, id: TimerId) -> Result<(), Error> {
        match (self.slots.get(id.index), self.generations.get(id.index)) {
            (Some(Some(_)), Some(&generation)) if generation == id.generation => Ok(()),
            _ => {
                debug!("stale timer handle {}", id.index);
                Err(Error::NotFound)
            }
        }
    }
}
