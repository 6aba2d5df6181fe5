//! Mock GPIO implementation for testing

use crate::platform::{
    error::{GpioError, PlatformError},
    traits::{GpioInterface, GpioMode, Level},
    Result,
};

/// Mock GPIO input
///
/// Tracks a simulated input level and mode, and can inject read failures to
/// exercise the detector's error path.
#[derive(Debug)]
pub struct MockGpio {
    level: Level,
    mode: GpioMode,
    failing_reads: u32,
}

impl MockGpio {
    /// Create a new mock input pin reading low
    pub fn new_input() -> Self {
        Self {
            level: Level::Low,
            mode: GpioMode::Input,
            failing_reads: 0,
        }
    }

    /// Set the simulated input level
    pub fn set_input_level(&mut self, level: Level) {
        self.level = level;
    }

    /// Make the next `n` reads fail with `GpioError::ReadFailed`
    pub fn fail_next_reads(&mut self, n: u32) {
        self.failing_reads = n;
    }
}

impl GpioInterface for MockGpio {
    fn read_level(&mut self) -> Result<Level> {
        if self.failing_reads > 0 {
            self.failing_reads -= 1;
            return Err(PlatformError::Gpio(GpioError::ReadFailed));
        }
        Ok(self.level)
    }

    fn set_mode(&mut self, mode: GpioMode) -> Result<()> {
        self.mode = mode;
        Ok(())
    }

    fn mode(&self) -> GpioMode {
        self.mode
    }
}
