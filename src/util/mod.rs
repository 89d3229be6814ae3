//! Utility modules for procfacts.

mod clock;

pub use clock::{FALLBACK_CLK_TCK, ticks_per_second};
