//! Debounced edge detector
//!
//! Turns the raw digital signal from the photo-interrupter into a clean
//! stream of rising edges. The detector is a pure state machine fed
//! `(level, timestamp)` samples; the polling loop that drives it on hardware
//! lives in [`run_detector`].
//!
//! Debounce policy: a falling transition opens an ignore window of
//! `filter_delay_ms` during which every sample is discarded, including
//! renewed rising edges. Mechanical/optical chatter on signal fall thus
//! collapses into one logical pulse per physical event. The cost is a hard
//! ceiling on detectable pulse rate of `1000 / (filter_delay_ms +
//! poll_delay_ms)` Hz: pulses arriving faster are silently merged.

use crate::platform::traits::Level;

#[cfg(feature = "embassy")]
use crate::core::counter::SharedCounter;
#[cfg(feature = "embassy")]
use crate::core::traits::sync::SharedState;
#[cfg(feature = "embassy")]
use crate::core::traits::time::TimeSource;
#[cfg(feature = "embassy")]
use crate::platform::traits::GpioInterface;

/// Milliseconds per hour, for instantaneous rate conversion
const MS_PER_HOUR: f32 = 3_600_000.0;

/// One confirmed rising edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeEvent {
    /// Monotonic timestamp of the edge, in milliseconds
    pub at_ms: u64,
    /// Time since the previous confirmed edge, if one exists
    pub delta_ms: Option<u64>,
}

impl EdgeEvent {
    /// Instantaneous pulse rate, in pulses per hour.
    ///
    /// `None` when this is the first edge (no inter-edge delta yet) or the
    /// delta is zero.
    pub fn rate_per_hour(&self) -> Option<f32> {
        match self.delta_ms {
            Some(delta) if delta > 0 => Some(MS_PER_HOUR / delta as f32),
            _ => None,
        }
    }
}

/// Result of feeding one sample to the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// No transition (steady level, or sample inside the filter window)
    Unchanged,
    /// Confirmed rising edge
    Edge(EdgeEvent),
    /// Falling transition; the filter window is now open and the polling
    /// loop may sleep through it
    FallFiltered,
}

/// Debouncing edge-detection state machine.
///
/// The previous level starts out unknown, so the very first sample is
/// treated as a transition: an initial high sample counts as an edge.
pub struct EdgeDetector {
    filter_delay_ms: u64,
    previous: Option<Level>,
    last_edge_at_ms: Option<u64>,
    ignore_until_ms: u64,
}

impl EdgeDetector {
    /// Create a detector with the given post-falling-edge filter delay.
    pub const fn new(filter_delay_ms: u32) -> Self {
        Self {
            filter_delay_ms: filter_delay_ms as u64,
            previous: None,
            last_edge_at_ms: None,
            ignore_until_ms: 0,
        }
    }

    /// Feed one sampled level taken at monotonic time `now_ms`.
    pub fn on_sample(&mut self, level: Level, now_ms: u64) -> PollOutcome {
        // Inside the bounce-filter window every transition is ignored
        if now_ms < self.ignore_until_ms {
            return PollOutcome::Unchanged;
        }

        match (self.previous, level) {
            (Some(Level::High), Level::High) | (Some(Level::Low), Level::Low) => {
                PollOutcome::Unchanged
            }
            (Some(Level::Low), Level::High) | (None, Level::High) => {
                self.previous = Some(Level::High);
                let delta_ms = self.last_edge_at_ms.map(|t| now_ms.saturating_sub(t));
                self.last_edge_at_ms = Some(now_ms);
                PollOutcome::Edge(EdgeEvent { at_ms: now_ms, delta_ms })
            }
            (Some(Level::High), Level::Low) | (None, Level::Low) => {
                self.previous = Some(Level::Low);
                self.ignore_until_ms = now_ms + self.filter_delay_ms;
                PollOutcome::FallFiltered
            }
        }
    }
}

/// Detector polling loop.
///
/// Samples the input every `poll_delay_ms`, feeds the state machine,
/// increments the shared counter on each confirmed edge and logs the
/// instantaneous rate. After a falling transition the loop additionally
/// sleeps through the filter window instead of burning polls on samples the
/// machine would discard.
///
/// Runs for the lifetime of the process; a failed level read is logged and
/// treated as "no transition this poll".
#[cfg(feature = "embassy")]
pub async fn run_detector<G, T, S>(
    mut gpio: G,
    time: T,
    counter: &SharedCounter<S>,
    poll_delay_ms: u32,
    filter_delay_ms: u32,
) -> !
where
    G: GpioInterface,
    T: TimeSource,
    S: SharedState<u32>,
{
    use embassy_time::Timer;

    crate::log_info!("edge detector started");
    let mut detector = EdgeDetector::new(filter_delay_ms);

    loop {
        match gpio.read_level() {
            Ok(level) => match detector.on_sample(level, time.now_ms()) {
                PollOutcome::Edge(edge) => {
                    counter.increment();
                    match (edge.delta_ms, edge.rate_per_hour()) {
                        (Some(delta), Some(rate)) => {
                            crate::log_info!("pulse: {} ms since last, {} pulses/h", delta, rate);
                        }
                        _ => crate::log_info!("pulse detected"),
                    }
                }
                PollOutcome::FallFiltered => {
                    Timer::after_millis(filter_delay_ms as u64).await;
                }
                PollOutcome::Unchanged => {}
            },
            Err(e) => {
                crate::log_warn!("sensor read failed: {}", e);
            }
        }

        Timer::after_millis(poll_delay_ms as u64).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_edge(outcome: PollOutcome) -> EdgeEvent {
        match outcome {
            PollOutcome::Edge(e) => e,
            other => panic!("expected edge, got {:?}", other),
        }
    }

    #[test]
    fn first_high_sample_counts_as_edge() {
        let mut det = EdgeDetector::new(50);
        let edge = expect_edge(det.on_sample(Level::High, 0));
        assert_eq!(edge.at_ms, 0);
        assert_eq!(edge.delta_ms, None);
    }

    #[test]
    fn steady_levels_produce_no_edges() {
        let mut det = EdgeDetector::new(50);
        det.on_sample(Level::High, 0);
        assert_eq!(det.on_sample(Level::High, 2), PollOutcome::Unchanged);
        assert_eq!(det.on_sample(Level::High, 4), PollOutcome::Unchanged);
    }

    #[test]
    fn bounce_within_filter_window_counts_once() {
        // Levels sampled as HIGH, LOW(+3ms), HIGH(+4ms), LOW with a 25 ms
        // filter delay: one physical pulse, one counted edge.
        let mut det = EdgeDetector::new(25);

        expect_edge(det.on_sample(Level::High, 0));
        assert_eq!(det.on_sample(Level::Low, 3), PollOutcome::FallFiltered);
        // Bounce back high 4 ms later: still inside the window, ignored
        assert_eq!(det.on_sample(Level::High, 7), PollOutcome::Unchanged);
        assert_eq!(det.on_sample(Level::Low, 9), PollOutcome::Unchanged);
        // After the window the line is low again: steady, still no edge
        assert_eq!(det.on_sample(Level::Low, 30), PollOutcome::Unchanged);
    }

    #[test]
    fn pulse_after_filter_window_counts_again() {
        let mut det = EdgeDetector::new(25);

        expect_edge(det.on_sample(Level::High, 0));
        assert_eq!(det.on_sample(Level::Low, 10), PollOutcome::FallFiltered);
        // Next pulse arrives after the window has expired
        let edge = expect_edge(det.on_sample(Level::High, 40));
        assert_eq!(edge.delta_ms, Some(40));
    }

    #[test]
    fn rate_from_one_second_delta() {
        let mut det = EdgeDetector::new(25);

        expect_edge(det.on_sample(Level::High, 0));
        det.on_sample(Level::Low, 100);
        let edge = expect_edge(det.on_sample(Level::High, 1000));
        assert_eq!(edge.delta_ms, Some(1000));
        assert_eq!(edge.rate_per_hour(), Some(3600.0));
    }

    #[test]
    fn initial_low_opens_filter_window() {
        // Matches the original behavior: the first sample is a transition
        // from the unknown state, and a low one starts the filter window.
        let mut det = EdgeDetector::new(25);
        assert_eq!(det.on_sample(Level::Low, 0), PollOutcome::FallFiltered);
        // Edge inside that window is ignored...
        assert_eq!(det.on_sample(Level::High, 10), PollOutcome::Unchanged);
        // ...but counted once the window has passed
        expect_edge(det.on_sample(Level::High, 25));
    }

    #[test]
    fn first_edge_has_no_rate() {
        let mut det = EdgeDetector::new(25);
        let edge = expect_edge(det.on_sample(Level::High, 5));
        assert_eq!(edge.rate_per_hour(), None);
    }
}
