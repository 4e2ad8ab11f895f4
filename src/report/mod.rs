//! Presentation of pipeline outputs: detailed analysis and terminal text.

pub mod analysis;
pub mod format;

pub use analysis::*;
pub use format::*;
