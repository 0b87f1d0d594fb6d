//! Configuration, scheduling, and tick orchestration for the Unrest
//! simulation.
//!
//! This crate ties the grid (`unrest-world`) and the agent rules
//! (`unrest-agents`) into a runnable model.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration ([`UnrestConfig`], [`ModelConfig`]) and [`ConfigError`].
//! - [`model`] -- The orchestrator ([`Model`]): construction and `step`.
//! - [`runner`] -- Run loop with a per-tick callback ([`run`], [`RunResult`]).
//! - [`scheduler`] -- Activation policies ([`Scheduler`]).
//! - [`world`] -- Grid plus population and action commit ([`World`]).

pub mod config;
pub mod model;
pub mod runner;
pub mod scheduler;
pub mod world;

// Re-export primary types at crate root for convenience.
pub use config::{ConfigError, LoggingConfig, ModelConfig, ResolvedConfig, UnrestConfig};
pub use model::Model;
pub use runner::{EndReason, NoOpCallback, RunResult, TickCallback, log_run_end, run};
pub use scheduler::{Activation, Scheduler};
pub use world::{Commit, World};
