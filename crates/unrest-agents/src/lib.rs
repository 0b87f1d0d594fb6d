//! Agent state and decision logic for the Unrest simulation.
//!
//! This crate is the logic layer for agents: everything that reads the grid
//! and agent state to decide what an agent does next, without owning the
//! run. Decisions are returned as [`Action`] values; committing them is the
//! orchestrator's job in `unrest-core`.
//!
//! # Modules
//!
//! - [`agent`] -- [`Agent`] variants ([`Citizen`], [`Cop`]) and lookups.
//! - [`error`] -- Error types ([`LegitimacyError`]).
//! - [`jail`] -- Imprisonment, sentence countdown, and release placement.
//! - [`legitimacy`] -- Legitimacy sampling and the one-time [`AidShock`].
//! - [`rules`] -- Citizen and cop decision rules producing [`Action`]s.

pub mod agent;
pub mod error;
pub mod jail;
pub mod legitimacy;
pub mod rules;

// Re-export primary types at crate root for convenience.
pub use agent::{Agent, Citizen, CitizenTraits, Cop};
pub use error::LegitimacyError;
pub use jail::JailTick;
pub use legitimacy::{AidShock, Legitimacy, LegitimacyParams};
pub use rules::{Action, CitizenAction, CopAction, RuleParams, decide};
