//! Core meter functionality
//!
//! This module contains the heart of the meter: the debounced edge detector,
//! the shared pulse counter, and the wall-clock-aligned interval recorder.

pub mod counter;
pub mod detector;
pub mod interval;
pub mod logging;
pub mod traits;
