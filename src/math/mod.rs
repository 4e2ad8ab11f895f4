//! Mathematical utilities: descriptive statistics, banded lookups and linear anchors.

pub mod bands;
pub mod stats;

pub use bands::*;
pub use stats::*;
