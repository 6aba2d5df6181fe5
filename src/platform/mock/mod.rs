//! Mock platform implementation for testing
//!
//! This module provides mock implementations of the platform traits so the
//! detector, recorder and storage logic can be unit tested without hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled

#![cfg(any(test, feature = "mock"))]

mod clock;
mod flash;
mod gpio;

pub use clock::MockClock;
pub use flash::MockFlash;
pub use gpio::MockGpio;
