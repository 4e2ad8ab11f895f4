//! Command-line parsing for the body-fat ensemble.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! estimation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "bfe", version, about = "Body-fat estimation by confidence-weighted ensemble")]
pub struct Cli {
    /// Enable debug logging on stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate body fat for a single request JSON.
    Estimate(EstimateArgs),
    /// Estimate body fat for a JSON array of requests, in parallel.
    Batch(EstimateArgs),
}

/// Options shared by `estimate` and `batch`.
#[derive(Debug, Args, Clone)]
pub struct EstimateArgs {
    /// Request JSON (a single request, or an array for `batch`).
    #[arg(short, long, value_name = "JSON")]
    pub input: PathBuf,

    /// Publish the experimental blend that includes the ML estimate.
    #[arg(long)]
    pub experimental: bool,

    /// Amplitude of the uniform noise added to the rule estimate.
    #[arg(long, value_name = "AMPLITUDE")]
    pub noise: Option<f64>,

    /// Seed for the rule-estimate noise.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Linear regression model JSON (`{"intercept": .., "coefficients": [..9]}`).
    #[arg(long, value_name = "JSON")]
    pub model: Option<PathBuf>,

    /// Print JSON instead of the text report.
    #[arg(long)]
    pub json: bool,

    /// Write the output (with timestamp) to a JSON file.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}
