//! Confidence-weighted fusion of the per-method estimates.

pub mod confidence;
pub mod ensemble;
pub mod validator;

pub use confidence::*;
pub use ensemble::*;
pub use validator::*;
