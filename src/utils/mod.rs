//! Utility functions
//!
//! Provides clock and logging utilities.

pub mod clock;
pub mod logging;

pub use clock::{Clock, FixedClock, SystemClock};
