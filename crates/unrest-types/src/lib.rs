//! Shared type definitions for the Unrest simulation.
//!
//! This crate is the single source of truth for the plain data types used
//! across the Unrest workspace: identifiers, grid positions, agent tags, and
//! the records the engine hands to external collaborators (charting, export,
//! rendering).
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifier wrappers
//! - [`enums`] -- Enumeration types (breed, condition, scheduler, legitimacy
//!   distribution, aid direction)
//! - [`structs`] -- Positions, per-tick summaries, per-agent records

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AidDirection, Breed, Condition, DistributionKind, SchedulerKind};
pub use ids::AgentId;
pub use structs::{AgentRecord, Position, TickSummary};
