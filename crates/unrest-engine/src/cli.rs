//! Command-line arguments using clap.
//!
//! Flags override the matching fields of the loaded configuration file.

use std::path::PathBuf;

use clap::Parser;

use unrest_core::ModelConfig;

/// Run a civil-violence simulation and export its per-tick counts.
#[derive(Parser, Debug, Clone)]
#[command(name = "unrest-engine")]
#[command(about = "Run a civil-violence simulation and export per-tick counts")]
pub struct Args {
    /// YAML configuration file. Defaults are used if it does not exist.
    #[arg(long, env = "UNREST_CONFIG", default_value = "unrest-config.yaml")]
    pub config: PathBuf,

    /// Override the random seed.
    #[arg(long, env = "UNREST_SEED")]
    pub seed: Option<u64>,

    /// Override the activation policy (e.g. Random, Staged, `BaseScheduler`).
    #[arg(long)]
    pub scheduler: Option<String>,

    /// Stop after this many ticks even if the model is still running.
    #[arg(long)]
    pub max_ticks: Option<u64>,

    /// Write one JSON tick summary per line to this file.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Write the final per-agent records as a JSON array to this file.
    #[arg(long)]
    pub agents_out: Option<PathBuf>,
}

impl Args {
    /// Apply command-line overrides to the model configuration.
    pub fn apply_overrides(&self, model: &mut ModelConfig) {
        if let Some(seed) = self.seed {
            model.seed = seed;
        }
        if let Some(ref scheduler) = self.scheduler {
            model.scheduler.clone_from(scheduler);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_config_file() {
        let args = Args::try_parse_from(["unrest-engine"]).unwrap();
        assert_eq!(args.config, PathBuf::from("unrest-config.yaml"));
        assert!(args.output.is_none());
        assert!(args.max_ticks.is_none());
    }

    #[test]
    fn overrides_replace_config_fields() {
        let args = Args::try_parse_from([
            "unrest-engine",
            "--seed",
            "9",
            "--scheduler",
            "StagedActivation",
            "--max-ticks",
            "50",
            "--output",
            "ticks.jsonl",
        ])
        .unwrap();
        let mut model = ModelConfig::default();
        args.apply_overrides(&mut model);

        assert_eq!(model.seed, 9);
        assert_eq!(model.scheduler, "StagedActivation");
        assert_eq!(args.max_ticks, Some(50));
        assert_eq!(args.output, Some(PathBuf::from("ticks.jsonl")));
    }

    #[test]
    fn non_numeric_seed_rejected() {
        assert!(Args::try_parse_from(["unrest-engine", "--seed", "abc"]).is_err());
    }
}
