//! Provisioned wall clock for the Pico 2 W
//!
//! The board has no battery-backed RTC, so calendar time is anchored once at
//! boot (a provisioned Unix timestamp, see `config::clock_anchor_unix`) and
//! advanced by the monotonic embassy timer. Swapping in an external RTC chip
//! only means providing another [`WallClock`] implementation.

use crate::platform::traits::{DateTime, WallClock};
use embassy_time::Instant;

/// Wall clock derived from a Unix anchor plus the monotonic timer
pub struct MonotonicWallClock {
    anchor_unix: u64,
    anchor_instant: Instant,
}

impl MonotonicWallClock {
    /// Anchor the clock: `anchor_unix` is the Unix time corresponding to now
    pub fn new(anchor_unix: u64) -> Self {
        Self {
            anchor_unix,
            anchor_instant: Instant::now(),
        }
    }
}

impl WallClock for MonotonicWallClock {
    fn now(&self) -> DateTime {
        let elapsed = self.anchor_instant.elapsed().as_secs();
        DateTime::from_unix_seconds(self.anchor_unix + elapsed)
    }
}
