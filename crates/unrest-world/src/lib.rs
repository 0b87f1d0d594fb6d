//! Spatial layer for the Unrest simulation.
//!
//! The world is a fixed-size lattice of hexagonal cells that wraps in both
//! axes. Each cell holds at most one agent. The grid answers the only
//! spatial questions the decision rules ask: who is within `radius` rings
//! of a cell, and which of those cells are empty.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid operations.
//! - [`grid`] -- [`HexGrid`]: occupancy, ring neighborhoods, relocation.

pub mod error;
pub mod grid;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use grid::HexGrid;
