//! Shared pulse counter
//!
//! A single lock-guarded accumulator shared between the edge detector (which
//! only increments) and the interval recorder (which drains). Both
//! operations are O(1) and perform no I/O while the lock is held.

use crate::core::traits::sync::SharedState;

/// Lock-guarded pulse accumulator.
///
/// The counter value always equals the number of confirmed edges since the
/// last drain. `drain` reads and resets in one critical section, so no
/// increment is ever lost or counted twice: a concurrent increment lands
/// either in the value a drain returns or in the epoch after it, never both.
///
/// # Example
///
/// ```
/// use pulse_meter::core::counter::SharedCounter;
/// use pulse_meter::core::traits::sync::MockState;
///
/// let counter = SharedCounter::new(MockState::new(0));
/// counter.increment();
/// counter.increment();
/// assert_eq!(counter.drain(), 2);
/// assert_eq!(counter.drain(), 0);
/// ```
pub struct SharedCounter<S: SharedState<u32>> {
    inner: S,
}

impl<S: SharedState<u32>> SharedCounter<S> {
    /// Create a counter over the given synchronized cell.
    ///
    /// Const so the embassy-backed form can live in a static.
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Add one confirmed edge.
    pub fn increment(&self) {
        self.inner.with_mut(|count| *count = count.saturating_add(1));
    }

    /// Return the accumulated count and reset it to zero, atomically.
    pub fn drain(&self) -> u32 {
        self.inner.with_mut(|count| core::mem::replace(count, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::sync::MockState;

    fn counter() -> SharedCounter<MockState<u32>> {
        SharedCounter::new(MockState::new(0))
    }

    #[test]
    fn increments_accumulate() {
        let c = counter();
        for _ in 0..5 {
            c.increment();
        }
        assert_eq!(c.drain(), 5);
    }

    #[test]
    fn drain_resets_to_zero() {
        let c = counter();
        c.increment();
        assert_eq!(c.drain(), 1);
        assert_eq!(c.drain(), 0);
    }

    #[test]
    fn no_lost_or_duplicate_increments_across_drains() {
        // Interleave increments and drains arbitrarily; every increment must
        // be counted in exactly one drain.
        let c = counter();
        let mut drained_total = 0u32;
        let mut incremented = 0u32;

        for round in 1..=10u32 {
            for _ in 0..round {
                c.increment();
                incremented += 1;
            }
            if round % 3 == 0 {
                drained_total += c.drain();
            }
        }
        drained_total += c.drain();

        assert_eq!(drained_total, incremented);
        assert_eq!(c.drain(), 0);
    }
}
