//! Black-box regression model: feature construction and the predictor seam.

pub mod features;
pub mod regressor;

pub use features::*;
pub use regressor::*;
