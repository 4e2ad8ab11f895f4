//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - merges environment config with CLI overrides
//! - loads the optional regression model
//! - runs the pipeline and prints/exports the results

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, EstimateArgs};
use crate::domain::EstimateConfig;
use crate::error::AppError;
use crate::io::{ExportRecord, read_batch, read_request, write_export_json};
use crate::models::{LinearRegressor, Regressor};

pub mod pipeline;

/// Entry point for the `bfe` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Estimate(args) => handle_estimate(&args),
        Command::Batch(args) => handle_batch(&args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Environment config with CLI flags applied on top.
pub fn config_from_args(args: &EstimateArgs) -> Result<EstimateConfig, AppError> {
    let mut config = EstimateConfig::from_env()?;
    if args.experimental {
        config.use_experimental_ml = true;
    }
    if let Some(amplitude) = args.noise {
        config.noise.amplitude = amplitude;
    }
    if let Some(seed) = args.seed {
        config.noise.seed = Some(seed);
    }
    config
        .noise
        .validate()
        .map_err(|e| AppError::new(2, format!("--noise: {e}")))?;
    Ok(config)
}

fn load_regressor(args: &EstimateArgs) -> Result<Option<LinearRegressor>, AppError> {
    args.model
        .as_deref()
        .map(LinearRegressor::from_file)
        .transpose()
        .map_err(AppError::from)
}

fn handle_estimate(args: &EstimateArgs) -> Result<(), AppError> {
    let config = config_from_args(args)?;
    let model = load_regressor(args)?;
    let request = read_request(&args.input)?;

    let output = pipeline::run_request(&request, &config, model.as_ref().map(|m| m as &dyn Regressor))?;

    if args.json {
        let text = serde_json::to_string_pretty(&output)
            .map_err(|e| AppError::new(2, format!("Failed to serialize output: {e}")))?;
        println!("{text}");
    } else {
        println!("{}", crate::report::format_estimate(&output));
    }

    if let Some(path) = &args.export {
        write_export_json(path, &ExportRecord::new(output.id.as_deref(), &output))?;
    }

    Ok(())
}

fn handle_batch(args: &EstimateArgs) -> Result<(), AppError> {
    let config = config_from_args(args)?;
    let model = load_regressor(args)?;
    let requests = read_batch(&args.input)?;

    let entries = pipeline::run_batch(&requests, &config, model.as_ref().map(|m| m as &dyn Regressor));

    if args.json {
        let text = serde_json::to_string_pretty(&entries)
            .map_err(|e| AppError::new(2, format!("Failed to serialize output: {e}")))?;
        println!("{text}");
    } else {
        for entry in &entries {
            println!("{}", crate::report::format_batch_line(entry));
        }
        let failed = entries.iter().filter(|e| e.error.is_some()).count();
        println!("{} requests, {} failed", entries.len(), failed);
    }

    if let Some(path) = &args.export {
        let records: Vec<_> = entries
            .iter()
            .map(|e| ExportRecord::new(Some(e.id.as_str()), e))
            .collect();
        write_export_json(path, &records)?;
    }

    Ok(())
}
