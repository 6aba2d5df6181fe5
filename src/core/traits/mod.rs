//! Core abstraction traits
//!
//! Synchronization and monotonic-time seams that let the detection and
//! recording logic run unchanged on the embassy runtime or in host tests.

pub mod sync;
pub mod time;

pub use sync::{MockState, SharedState};
pub use time::{MockTime, TimeSource};

#[cfg(feature = "embassy")]
pub use sync::EmbassyState;
#[cfg(feature = "embassy")]
pub use time::EmbassyTime;
