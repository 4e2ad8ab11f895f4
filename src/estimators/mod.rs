//! Leaf estimators.
//!
//! Responsibilities:
//!
//! - convert landmark distances into ratios
//! - bucket the subject into a coarse body type
//! - produce the rule-based and the texture-based body-fat estimates

pub mod classifier;
pub mod ratios;
pub mod rules;
pub mod texture;

pub use classifier::*;
pub use ratios::*;
pub use rules::*;
pub use texture::*;
