//! Wall-clock-aligned interval recording
//!
//! The recorder wakes at save boundaries (every `interval_minutes`, aligned
//! to the hour), drains the shared pulse counter and appends one
//! [`IntervalSample`] to the persistence sink. A wake that misses its
//! boundary (sleep drift, clock adjustment) still drains the counter but
//! discards the value, so a bad interval can never inflate the next one.

use crate::config::AVERAGE_WINDOW;
use crate::core::counter::SharedCounter;
use crate::core::traits::sync::SharedState;
use crate::platform::traits::DateTime;
use crate::storage::{IntervalSample, PersistenceSink, StorageError};
use heapless::HistoryBuffer;

/// Seconds to sleep until the next save boundary.
///
/// Implements `(interval - minute % interval) * 60 - second` with the
/// already-on-boundary case collapsing to zero: waking up exactly on a
/// boundary means there is nothing left to wait for. The result is clamped
/// so a skewed clock can never produce a negative sleep.
pub fn seconds_until_boundary(minute: u8, second: u8, interval_minutes: u8) -> u32 {
    let past = i32::from(minute % interval_minutes) * 60 + i32::from(second);
    if past <= 0 {
        return 0;
    }
    let full = i32::from(interval_minutes) * 60;
    (full - past).max(0) as u32
}

/// Whether a wake-time minute lands on a save boundary.
pub fn is_on_boundary(minute: u8, interval_minutes: u8) -> bool {
    minute % interval_minutes == 0
}

/// Rolling average of recent interval counts, reported as pulses per hour.
///
/// The window warms up from zero: until [`AVERAGE_WINDOW`] intervals have
/// been recorded, missing entries count as zero, so the reported rate ramps
/// toward the true value instead of overshooting on the first interval.
#[derive(Default)]
pub struct RollingRate {
    window: HistoryBuffer<u32, AVERAGE_WINDOW>,
}

impl RollingRate {
    pub fn new() -> Self {
        Self {
            window: HistoryBuffer::new(),
        }
    }

    /// Record one interval's drained count.
    pub fn push(&mut self, blinks: u32) {
        self.window.write(blinks);
    }

    /// Windowed average rate in pulses per hour.
    pub fn per_hour(&self, interval_minutes: u8) -> f32 {
        let sum: u32 = self.window.as_slice().iter().sum();
        let avg = sum as f32 / AVERAGE_WINDOW as f32;
        avg * 60.0 / interval_minutes as f32
    }
}

/// What happened at one boundary wake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeOutcome {
    /// Sample persisted
    Recorded(IntervalSample),
    /// Wake missed the boundary; drained count thrown away
    Discarded { blinks: u32 },
    /// Sink refused the sample; that interval's data is lost
    InsertFailed { blinks: u32, error: StorageError },
}

/// Drains the counter at each wake and persists boundary-aligned samples.
pub struct IntervalRecorder<P: PersistenceSink> {
    sink: P,
    interval_minutes: u8,
    rolling: RollingRate,
}

impl<P: PersistenceSink> IntervalRecorder<P> {
    pub fn new(sink: P, interval_minutes: u8) -> Self {
        Self {
            sink,
            interval_minutes,
            rolling: RollingRate::new(),
        }
    }

    pub fn interval_minutes(&self) -> u8 {
        self.interval_minutes
    }

    /// Borrow the sink (test verification).
    pub fn sink_mut(&mut self) -> &mut P {
        &mut self.sink
    }

    /// Handle one wake: drain, guard the boundary, persist.
    ///
    /// The counter is drained before the boundary check on purpose; an
    /// off-boundary wake must still reset the count or its pulses would be
    /// double-accumulated into the following interval.
    pub fn process_wake<S: SharedState<u32>>(
        &mut self,
        counter: &SharedCounter<S>,
        wake: &DateTime,
    ) -> WakeOutcome {
        let blinks = counter.drain();

        if !is_on_boundary(wake.minute, self.interval_minutes) {
            crate::log_warn!(
                "woke off boundary at minute {}, discarding {} pulses",
                wake.minute,
                blinks
            );
            return WakeOutcome::Discarded { blinks };
        }

        self.rolling.push(blinks);
        crate::log_info!(
            "interval ending {}:{}: {} pulses, {} pulses/h averaged",
            wake.hour,
            wake.minute,
            blinks,
            self.rolling.per_hour(self.interval_minutes)
        );

        let sample = IntervalSample::new(wake, blinks);
        match self.sink.insert(&sample) {
            Ok(()) => WakeOutcome::Recorded(sample),
            Err(error) => {
                crate::log_error!(
                    "insert failed for minute {}: {} ({} pulses lost)",
                    wake.minute,
                    error,
                    blinks
                );
                WakeOutcome::InsertFailed { blinks, error }
            }
        }
    }
}

/// Recorder loop: sleep to each save boundary, then drain and persist.
///
/// Runs for the lifetime of the process. After handling a wake the loop
/// steps one second past the boundary so a zero-delay wake cannot fire twice
/// within the same boundary second.
#[cfg(feature = "embassy")]
pub async fn run_recorder<C, P, S>(
    clock: &C,
    recorder: &mut IntervalRecorder<P>,
    counter: &SharedCounter<S>,
) -> !
where
    C: crate::platform::traits::WallClock,
    P: PersistenceSink,
    S: SharedState<u32>,
{
    use embassy_time::Timer;

    crate::log_info!(
        "interval recorder started, saving every {} min",
        recorder.interval_minutes()
    );

    loop {
        let now = clock.now();
        let delay = seconds_until_boundary(now.minute, now.second, recorder.interval_minutes());
        crate::log_info!("next save boundary in {} s", delay);
        Timer::after_secs(delay as u64).await;

        let wake = clock.now();
        recorder.process_wake(counter, &wake);

        Timer::after_secs(1).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::sync::MockState;
    use crate::storage::mock::MockSink;

    fn counter() -> SharedCounter<MockState<u32>> {
        SharedCounter::new(MockState::new(0))
    }

    fn recorder() -> IntervalRecorder<MockSink> {
        let mut sink = MockSink::new();
        sink.ensure_schema().unwrap();
        IntervalRecorder::new(sink, 5)
    }

    fn wake_at(minute: u8) -> DateTime {
        DateTime {
            year: 2026,
            month: 8,
            day: 5,
            hour: 11,
            minute,
            second: 0,
        }
    }

    #[test]
    fn delay_mid_interval() {
        assert_eq!(seconds_until_boundary(12, 30, 5), 150);
        assert_eq!(seconds_until_boundary(14, 59, 5), 1);
        assert_eq!(seconds_until_boundary(11, 0, 5), 240);
    }

    #[test]
    fn delay_on_exact_boundary_is_zero() {
        // Already on a boundary: sleep 0, never a negative duration
        assert_eq!(seconds_until_boundary(10, 0, 5), 0);
        assert_eq!(seconds_until_boundary(0, 0, 5), 0);
        assert_eq!(seconds_until_boundary(0, 0, 60), 0);
    }

    #[test]
    fn delay_with_hourly_interval() {
        assert_eq!(seconds_until_boundary(59, 59, 60), 1);
        assert_eq!(seconds_until_boundary(0, 1, 60), 3599);
    }

    #[test]
    fn boundary_check() {
        assert!(is_on_boundary(0, 5));
        assert!(is_on_boundary(55, 5));
        assert!(!is_on_boundary(3, 5));
        assert!(is_on_boundary(17, 1));
    }

    #[test]
    fn on_boundary_wake_records_sample() {
        let c = counter();
        let mut rec = recorder();
        for _ in 0..42 {
            c.increment();
        }

        let outcome = rec.process_wake(&c, &wake_at(10));
        match outcome {
            WakeOutcome::Recorded(sample) => {
                assert_eq!(sample.blinks, 42);
                assert_eq!(sample.minute, 10);
                assert_eq!(sample.year, 2026);
            }
            other => panic!("expected Recorded, got {:?}", other),
        }
        assert_eq!(rec.sink_mut().samples().len(), 1);
        // Counter fully drained
        assert_eq!(c.drain(), 0);
    }

    #[test]
    fn off_boundary_wake_discards_but_drains() {
        let c = counter();
        let mut rec = recorder();
        for _ in 0..9 {
            c.increment();
        }

        // Simulated clock drift: woke at minute 13 with a 5-minute interval
        let outcome = rec.process_wake(&c, &wake_at(13));
        assert_eq!(outcome, WakeOutcome::Discarded { blinks: 9 });
        assert!(rec.sink_mut().samples().is_empty());

        // The next interval starts at zero, not inflated by the 9 pulses
        for _ in 0..4 {
            c.increment();
        }
        match rec.process_wake(&c, &wake_at(15)) {
            WakeOutcome::Recorded(sample) => assert_eq!(sample.blinks, 4),
            other => panic!("expected Recorded, got {:?}", other),
        }
    }

    #[test]
    fn insert_failure_loses_only_that_interval() {
        let c = counter();
        let mut rec = recorder();
        rec.sink_mut().fail_next_inserts(1);

        for _ in 0..7 {
            c.increment();
        }
        match rec.process_wake(&c, &wake_at(20)) {
            WakeOutcome::InsertFailed { blinks, .. } => assert_eq!(blinks, 7),
            other => panic!("expected InsertFailed, got {:?}", other),
        }

        // Following interval is unaffected by the failure
        for _ in 0..5 {
            c.increment();
        }
        match rec.process_wake(&c, &wake_at(25)) {
            WakeOutcome::Recorded(sample) => assert_eq!(sample.blinks, 5),
            other => panic!("expected Recorded, got {:?}", other),
        }
        assert_eq!(rec.sink_mut().samples().len(), 1);
    }

    #[test]
    fn idle_interval_records_zero() {
        let c = counter();
        let mut rec = recorder();
        match rec.process_wake(&c, &wake_at(30)) {
            WakeOutcome::Recorded(sample) => assert_eq!(sample.blinks, 0),
            other => panic!("expected Recorded, got {:?}", other),
        }
    }

    #[test]
    fn rolling_rate_warms_up_from_zero() {
        let mut rate = RollingRate::new();
        rate.push(60);
        // One 5-minute interval of 60 pulses, averaged over the whole
        // 6-slot window: 10 pulses per interval, 12 intervals per hour
        assert_eq!(rate.per_hour(5), 120.0);

        for _ in 0..5 {
            rate.push(60);
        }
        // Window saturated at a steady 60 pulses per interval
        assert_eq!(rate.per_hour(5), 720.0);
    }

    #[test]
    fn rolling_rate_empty_is_zero() {
        let rate = RollingRate::new();
        assert_eq!(rate.per_hour(5), 0.0);
    }
}
