//! Command-line runner for the Unrest simulation.
//!
//! # Startup Sequence
//!
//! 1. Parse command-line arguments
//! 2. Load configuration from `unrest-config.yaml` (defaults if missing)
//! 3. Initialize structured logging (tracing)
//! 4. Construct the model
//! 5. Run until the model stops or the tick cap is hit, streaming tick
//!    summaries to the output file if one was given
//! 6. Log the result and dump final agent records if requested

mod cli;
mod error;
mod export;

use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use unrest_core::{LoggingConfig, Model, NoOpCallback, UnrestConfig, runner};

use crate::cli::Args;
use crate::error::EngineError;
use crate::export::JsonLinesSink;

/// Application entry point.
///
/// # Errors
///
/// Returns an error (and a non-zero exit code) if the configuration is
/// invalid or an output file cannot be written.
fn main() -> Result<(), EngineError> {
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    args.apply_overrides(&mut config.model);

    init_logging(&config.logging);
    info!(
        config = %args.config.display(),
        seed = config.model.seed,
        scheduler = %config.model.scheduler,
        "unrest-engine starting"
    );

    let mut model = Model::new(&config.model)?;

    let result = if let Some(ref path) = args.output {
        let mut sink = JsonLinesSink::create(path)?;
        if let Some(initial) = model.history().first() {
            sink.write_summary(initial);
        }
        let result = runner::run(&mut model, args.max_ticks, &mut sink);
        let lines = sink.lines();
        sink.finish()?;
        info!(path = %path.display(), lines, "Tick summaries written");
        result
    } else {
        runner::run(&mut model, args.max_ticks, &mut NoOpCallback)
    };

    runner::log_run_end(&result);

    if let Some(ref path) = args.agents_out {
        let records = model.agent_records();
        export::write_agents(path, &records)?;
        info!(path = %path.display(), agents = records.len(), "Agent records written");
    }

    Ok(())
}

/// Load configuration from `path`, falling back to defaults if the file
/// does not exist.
fn load_config(path: &Path) -> Result<UnrestConfig, EngineError> {
    if path.exists() {
        let config = UnrestConfig::from_file(path)?;
        Ok(config)
    } else {
        // Logging is not up yet.
        eprintln!(
            "config file {} not found, using defaults",
            path.display()
        );
        Ok(UnrestConfig::default())
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured
/// level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
