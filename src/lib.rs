//! `bodyfat-ensemble` library crate.
//!
//! Estimates body-fat percentage by fusing a rule-based estimate, a
//! texture-based estimate and an optional black-box regression estimate.
//! The binary (`bfe`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the estimation core stays free of I/O and environment reads

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod estimators;
pub mod fusion;
pub mod io;
pub mod math;
pub mod models;
pub mod report;

pub use app::pipeline::{EstimateInputs, EstimateOutput, estimate, run_batch, run_request};
pub use domain::{EstimateConfig, FinalResult};
pub use error::{AppError, EstimateError};
