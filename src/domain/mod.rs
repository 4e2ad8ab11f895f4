//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - subject inputs (`SubjectProfile`, `Sex`) and upstream signals
//!   (`Measurements`, `TextureSignals`)
//! - derived values (`Ratios`, `BodyType`)
//! - fusion outputs (`FinalResult`, `FusionWeights`, `SpecialCases`, etc.)
//! - per-call configuration (`EstimateConfig`, `NoiseConfig`)

pub mod types;

pub use types::*;
