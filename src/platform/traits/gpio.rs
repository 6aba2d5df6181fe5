//! GPIO input interface trait
//!
//! This module defines the digital input interface that platform
//! implementations must provide for the pulse sensor pin.

use crate::platform::Result;

/// Digital level of an input pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic level 0
    Low,
    /// Logic level 1
    High,
}

impl Level {
    /// Convert a boolean pin state (`true` = high) to a level.
    pub fn from_high(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// GPIO input pin mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioMode {
    /// Input mode (high impedance)
    Input,
    /// Input mode with pull-up resistor
    InputPullUp,
    /// Input mode with pull-down resistor
    InputPullDown,
}

/// GPIO input interface trait
///
/// Platform implementations must provide this interface for the sensor pin.
///
/// # Safety Invariants
///
/// - The pin must be configured as a digital input before the first read
/// - Only one owner per GPIO pin instance
/// - No concurrent access to the same pin from multiple contexts
pub trait GpioInterface {
    /// Read the current digital level of the pin
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Gpio(GpioError::ReadFailed)` when the
    /// hardware layer cannot produce a level. Callers polling a sensor
    /// should treat a failed read as "no transition" and keep polling.
    fn read_level(&mut self) -> Result<Level>;

    /// Set GPIO pin mode
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Gpio` if the mode cannot be applied.
    fn set_mode(&mut self, mode: GpioMode) -> Result<()>;

    /// Get current GPIO pin mode
    fn mode(&self) -> GpioMode;
}
