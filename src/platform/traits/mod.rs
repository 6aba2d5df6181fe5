//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.

pub mod clock;
pub mod flash;
pub mod gpio;

// Re-export trait interfaces
pub use clock::{DateTime, WallClock};
pub use flash::FlashInterface;
pub use gpio::{GpioInterface, GpioMode, Level};
