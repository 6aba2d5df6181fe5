//! RP2350 (Raspberry Pi Pico 2 W) platform implementation
//!
//! Wraps embassy-rp peripherals behind the platform traits. Only compiled
//! for the `pico2_w` feature.

mod clock;
mod flash;
mod gpio;

pub use clock::MonotonicWallClock;
pub use flash::{Rp2350Flash, FLASH_SIZE};
pub use gpio::Rp2350Gpio;
