//! Configuration loading and typed config structures for the Unrest
//! simulation.
//!
//! The canonical configuration lives in `unrest-config.yaml` at the project
//! root. Every field has a default matching the classic civil-violence
//! model, so an empty file (or no file at all) yields a runnable setup.
//!
//! Names chosen from a fixed set (scheduler, legitimacy distribution, aid
//! direction) are kept as strings here and checked by
//! [`ModelConfig::resolve`], which is what the model calls at construction.

use std::path::Path;

use serde::{Deserialize, Serialize};

use unrest_agents::{Legitimacy, LegitimacyError, LegitimacyParams, RuleParams};
use unrest_types::{AidDirection, DistributionKind, SchedulerKind};
use unrest_world::WorldError;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The scheduler name is not one of the supported policies.
    #[error("unknown scheduler: {name}")]
    UnknownScheduler {
        /// The rejected name.
        name: String,
    },

    /// The legitimacy distribution name is not supported.
    #[error("unknown legitimacy distribution: {name}")]
    UnknownDistribution {
        /// The rejected name.
        name: String,
    },

    /// The aid direction is not one of "No Aid", "Aid Government",
    /// "Aid Rebellion".
    #[error("unknown international aid direction: {name}")]
    UnknownAidDirection {
        /// The rejected name.
        name: String,
    },

    /// A density is outside `[0, 1]` or the two sum to more than 1.
    #[error(
        "invalid densities: citizen={citizen_density}, cop={cop_density} (each must be in [0, 1] and sum to at most 1)"
    )]
    InvalidDensity {
        /// Configured citizen density.
        citizen_density: f64,
        /// Configured cop density.
        cop_density: f64,
    },

    /// A scalar model parameter is non-finite or out of its domain.
    #[error("invalid {name}: {value}")]
    InvalidParameter {
        /// Field name.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Legitimacy distribution parameters are unusable.
    #[error("invalid legitimacy parameters: {source}")]
    Legitimacy {
        /// The underlying sampler error.
        #[from]
        source: LegitimacyError,
    },

    /// The grid could not be built or populated.
    #[error("invalid grid: {source}")]
    World {
        /// The underlying grid error.
        #[from]
        source: WorldError,
    },

    /// Two agents in a scripted population share an identifier.
    #[error("duplicate agent id in population: {0}")]
    DuplicateAgent(unrest_types::AgentId),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration file.
///
/// Mirrors the structure of `unrest-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnrestConfig {
    /// Model parameters.
    #[serde(default)]
    pub model: ModelConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl UnrestConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable logs.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Everything needed to construct a [`Model`](crate::model::Model).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Grid columns.
    #[serde(default = "default_grid_size")]
    pub width: u32,

    /// Grid rows.
    #[serde(default = "default_grid_size")]
    pub height: u32,

    /// Probability that a cell not given a cop receives a citizen.
    #[serde(default = "default_citizen_density")]
    pub citizen_density: f64,

    /// Probability that a cell receives a cop.
    #[serde(default = "default_cop_density")]
    pub cop_density: f64,

    /// Vision radius of citizens, in hex rings.
    #[serde(default = "default_vision")]
    pub citizen_vision: u32,

    /// Vision radius of cops, in hex rings.
    #[serde(default = "default_vision")]
    pub cop_vision: u32,

    /// Legitimacy distribution name: uniform, normal, or gamma.
    #[serde(default = "default_legitimacy_distribution")]
    pub legitimacy_distribution: String,

    /// Parameters for the legitimacy distributions.
    #[serde(default)]
    pub legitimacy_params: LegitimacyParams,

    /// Longest jail sentence in ticks. Zero disables arrests.
    #[serde(default = "default_max_jail_term")]
    pub max_jail_term: u32,

    /// Net-risk level above which a citizen turns active.
    #[serde(default = "default_active_threshold")]
    pub active_threshold: f64,

    /// `k` in the arrest probability estimate.
    #[serde(default = "default_arrest_prob_constant")]
    pub arrest_prob_constant: f64,

    /// Whether agents relocate each tick.
    #[serde(default = "default_movement")]
    pub movement: bool,

    /// The model stops running once the iteration count exceeds this.
    #[serde(default = "default_max_iters")]
    pub max_iters: u64,

    /// Activation policy name (short or legacy form).
    #[serde(default = "default_scheduler")]
    pub scheduler: String,

    /// "No Aid", "Aid Government", or "Aid Rebellion".
    #[serde(default = "default_international_aid")]
    pub international_aid: String,

    /// Magnitude of the aid shock.
    #[serde(default = "default_shock_amount")]
    pub shock_amount: f64,

    /// Iteration at which the aid shock fires.
    #[serde(default = "default_shock_tick")]
    pub shock_tick: u64,

    /// Seed for the run's single random source.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            width: default_grid_size(),
            height: default_grid_size(),
            citizen_density: default_citizen_density(),
            cop_density: default_cop_density(),
            citizen_vision: default_vision(),
            cop_vision: default_vision(),
            legitimacy_distribution: default_legitimacy_distribution(),
            legitimacy_params: LegitimacyParams::default(),
            max_jail_term: default_max_jail_term(),
            active_threshold: default_active_threshold(),
            arrest_prob_constant: default_arrest_prob_constant(),
            movement: default_movement(),
            max_iters: default_max_iters(),
            scheduler: default_scheduler(),
            international_aid: default_international_aid(),
            shock_amount: default_shock_amount(),
            shock_tick: default_shock_tick(),
            seed: default_seed(),
        }
    }
}

/// The checked, typed view of a [`ModelConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedConfig {
    /// Activation policy.
    pub scheduler: SchedulerKind,
    /// Legitimacy sampler.
    pub legitimacy: Legitimacy,
    /// Aid shock direction.
    pub aid: AidDirection,
    /// Constants for the decision rules.
    pub rules: RuleParams,
}

impl ModelConfig {
    /// Validate every field and parse the named choices.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found: unknown names, densities
    /// out of range or summing past 1, a zero-sized grid, or unusable
    /// numeric parameters.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(WorldError::EmptyGrid {
                width: self.width,
                height: self.height,
            }
            .into());
        }

        let in_unit = |d: f64| (0.0..=1.0).contains(&d);
        if !in_unit(self.citizen_density)
            || !in_unit(self.cop_density)
            || self.citizen_density + self.cop_density > 1.0
        {
            return Err(ConfigError::InvalidDensity {
                citizen_density: self.citizen_density,
                cop_density: self.cop_density,
            });
        }

        check_finite("active_threshold", self.active_threshold)?;
        check_non_negative("arrest_prob_constant", self.arrest_prob_constant)?;
        check_non_negative("shock_amount", self.shock_amount)?;

        let scheduler = SchedulerKind::from_name(&self.scheduler).ok_or_else(|| {
            ConfigError::UnknownScheduler {
                name: self.scheduler.clone(),
            }
        })?;
        let kind = DistributionKind::from_name(&self.legitimacy_distribution).ok_or_else(|| {
            ConfigError::UnknownDistribution {
                name: self.legitimacy_distribution.clone(),
            }
        })?;
        let aid = AidDirection::from_name(&self.international_aid).ok_or_else(|| {
            ConfigError::UnknownAidDirection {
                name: self.international_aid.clone(),
            }
        })?;
        let legitimacy = Legitimacy::new(kind, &self.legitimacy_params)?;

        Ok(ResolvedConfig {
            scheduler,
            legitimacy,
            aid,
            rules: RuleParams {
                arrest_prob_constant: self.arrest_prob_constant,
                max_jail_term: self.max_jail_term,
                movement: self.movement,
            },
        })
    }
}

fn check_finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_grid_size() -> u32 {
    40
}

const fn default_citizen_density() -> f64 {
    0.7
}

const fn default_cop_density() -> f64 {
    0.074
}

const fn default_vision() -> u32 {
    7
}

fn default_legitimacy_distribution() -> String {
    "uniform".to_owned()
}

const fn default_max_jail_term() -> u32 {
    1000
}

const fn default_active_threshold() -> f64 {
    0.1
}

const fn default_arrest_prob_constant() -> f64 {
    2.3
}

const fn default_movement() -> bool {
    true
}

const fn default_max_iters() -> u64 {
    1000
}

fn default_scheduler() -> String {
    "Random".to_owned()
}

fn default_international_aid() -> String {
    "No Aid".to_owned()
}

const fn default_shock_amount() -> f64 {
    0.1
}

const fn default_shock_tick() -> u64 {
    100
}

const fn default_seed() -> u64 {
    42
}

fn default_log_level() -> String {
    "info".to_owned()
}
