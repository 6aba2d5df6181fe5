//! RP2350 GPIO input implementation
//!
//! Wraps an `embassy_rp::gpio::Input` to implement [`GpioInterface`] for the
//! sensor pin.

use crate::platform::{
    traits::{GpioInterface, GpioMode, Level},
    Result,
};
use embassy_rp::gpio::Input;

/// RP2350 GPIO input
pub struct Rp2350Gpio {
    pin: Input<'static>,
    mode: GpioMode,
}

impl Rp2350Gpio {
    /// Wrap an already-configured input pin
    ///
    /// The pull direction is fixed at `Input::new` time by the caller;
    /// `mode` records it for introspection.
    pub fn new(pin: Input<'static>, mode: GpioMode) -> Self {
        Self { pin, mode }
    }
}

impl GpioInterface for Rp2350Gpio {
    fn read_level(&mut self) -> Result<Level> {
        // The SIO level read cannot fail on this part
        Ok(Level::from_high(self.pin.is_high()))
    }

    fn set_mode(&mut self, mode: GpioMode) -> Result<()> {
        // Pull reconfiguration requires rebuilding the Input; record only
        self.mode = mode;
        Ok(())
    }

    fn mode(&self) -> GpioMode {
        self.mode
    }
}
