//! Startup configuration
//!
//! All knobs are fixed at startup; nothing here is runtime-reloadable. The
//! wall-clock anchor can be provisioned at build time through the
//! `METER_CLOCK_ANCHOR` environment variable (Unix seconds).

use crate::platform::error::{PlatformError, Result};
use crate::platform::traits::flash::BLOCK_SIZE;
use crate::platform::traits::GpioMode;

/// Number of recent intervals in the rolling rate window
pub const AVERAGE_WINDOW: usize = 6;

/// Build-time provisioned wall-clock anchor (Unix seconds)
///
/// build.rs parses the environment variable and defaults it to 0, which
/// renders timestamps from the 1970 epoch until a real anchor is flashed.
pub const CLOCK_ANCHOR_UNIX: u64 = {
    const S: &str = env!("METER_CLOCK_ANCHOR");
    const_parse_u64(S)
};

/// Parse u64 from string at compile time
const fn const_parse_u64(s: &str) -> u64 {
    let bytes = s.as_bytes();
    let mut value: u64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] < b'0' || bytes[i] > b'9' {
            return 0; // Invalid character
        }
        value = value * 10 + (bytes[i] - b'0') as u64;
        i += 1;
    }
    value
}

/// Meter head configuration.
///
/// Defaults match the deployed sensor wiring: open-collector
/// photo-interrupter on GPIO 16 with the internal pull-up, 2 ms poll, 50 ms
/// bounce filter, one saved record every 5 minutes.
#[derive(Debug, Clone, Copy)]
pub struct MeterConfig {
    /// GPIO pin the sensor output is wired to
    pub input_pin: u8,
    /// Pull direction for the sensor pin
    pub input_pull: GpioMode,
    /// Dead time after a falling transition, in milliseconds
    pub filter_delay_ms: u32,
    /// Sensor polling period, in milliseconds
    pub poll_delay_ms: u32,
    /// Save-interval length, in minutes; must divide an hour evenly
    pub interval_minutes: u8,
    /// Flash offset of the record-log region (block-aligned)
    pub log_base: u32,
    /// Record-log region size in flash blocks (header block included)
    pub log_blocks: u32,
    /// Unix seconds corresponding to boot time
    pub clock_anchor_unix: u64,
}

impl MeterConfig {
    /// Built-in defaults.
    pub const fn new() -> Self {
        Self {
            input_pin: 16,
            input_pull: GpioMode::InputPullUp,
            filter_delay_ms: 50,
            poll_delay_ms: 2,
            interval_minutes: 5,
            log_base: 0x0010_0000,
            log_blocks: 16,
            clock_anchor_unix: CLOCK_ANCHOR_UNIX,
        }
    }

    /// Check the configuration for values the meter cannot run with.
    pub fn validate(&self) -> Result<()> {
        // Boundary arithmetic assumes save boundaries tile the hour
        if self.interval_minutes == 0 || 60 % self.interval_minutes != 0 {
            return Err(PlatformError::InvalidConfig);
        }
        if self.poll_delay_ms == 0 || self.filter_delay_ms == 0 {
            return Err(PlatformError::InvalidConfig);
        }
        if self.log_base % BLOCK_SIZE != 0 || self.log_blocks < 2 {
            return Err(PlatformError::InvalidConfig);
        }
        Ok(())
    }
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self::new()
    }
}
