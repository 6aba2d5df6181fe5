//! Platform abstraction layer
//!
//! This module provides hardware abstraction for the meter head. All
//! platform-specific code must be isolated to this module so the core
//! detection and recording logic stays host-testable.

pub mod error;
pub mod traits;

// Platform implementations (feature-gated)
#[cfg(feature = "pico2_w")]
pub mod rp2350;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{PlatformError, Result};
pub use traits::{DateTime, FlashInterface, GpioInterface, GpioMode, Level, WallClock};
