//! Millisecond time source and deadline bookkeeping.
//!
//! Every wait in the driver is a busy-poll loop bounded by a wall-clock
//! deadline. The [`Clock`] trait is the only notion of time the driver has:
//! a monotonic millisecond counter, the same shape as the `millis()` tick
//! found on most microcontroller HALs.
//!
//! # Examples
//!
//! ```rust
//! use core::cell::Cell;
//! use esplink::system::clock::{Clock, Deadline};
//!
//! struct Ticks(Cell<u64>);
//!
//! impl Clock for Ticks {
//!     fn now_ms(&self) -> u64 {
//!         let now = self.0.get();
//!         self.0.set(now + 1);
//!         now
//!     }
//! }
//!
//! let clock = Ticks(Cell::new(0));
//! let deadline = Deadline::after(&clock, 3);
//! assert!(!deadline.expired(&clock));
//! assert!(deadline.expired(&clock));
//! ```

/// A monotonic millisecond time source.
pub trait Clock {
    /// Milliseconds elapsed since an arbitrary, fixed origin.
    fn now_ms(&self) -> u64;

    /// Busy-waits for `ms` milliseconds.
    ///
    /// The default spins on [`now_ms`](Clock::now_ms); platforms with a
    /// low-power delay can override it.
    fn delay_ms(&self, ms: u32) {
        let deadline = Deadline::after(self, ms);
        while !deadline.expired(self) {
            core::hint::spin_loop();
        }
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn delay_ms(&self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

/// An absolute instant computed as start time plus timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    start: u64,
    timeout: u64,
}

impl Deadline {
    /// Starts a deadline `timeout_ms` milliseconds from now.
    pub fn after<C: Clock + ?Sized>(clock: &C, timeout_ms: u32) -> Self {
        Self {
            start: clock.now_ms(),
            timeout: u64::from(timeout_ms),
        }
    }

    /// True once the elapsed time is no longer less than the timeout.
    pub fn expired<C: Clock + ?Sized>(&self, clock: &C) -> bool {
        clock.now_ms().saturating_sub(self.start) >= self.timeout
    }
}

/// A [`Clock`] backed by [`std::time::Instant`].
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    /// Creates a clock whose origin is the moment of construction.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn delay_ms(&self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
