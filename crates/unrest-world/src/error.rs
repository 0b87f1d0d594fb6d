//! Error types for the `unrest-world` crate.
//!
//! Every grid mutation validates its inputs and returns [`WorldError`]
//! instead of panicking. During a run these errors indicate a broken
//! engine contract (destinations are always drawn from empty cells), so
//! callers log and skip rather than surface them to users.

use unrest_types::{AgentId, Position};

/// Errors that can occur during grid operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorldError {
    /// A grid must have at least one row and one column.
    #[error("grid dimensions must be non-zero (got {width}x{height})")]
    EmptyGrid {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The grid is too large to index on this platform.
    #[error("grid {width}x{height} is too large")]
    TooLarge {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The position lies outside the grid.
    #[error("position {0} is outside the grid")]
    OutOfBounds(Position),

    /// The target cell already holds another agent.
    #[error("cell {cell} is occupied by agent {occupant}")]
    CellOccupied {
        /// The contested cell.
        cell: Position,
        /// The agent already there.
        occupant: AgentId,
    },

    /// The agent is not at the cell the caller claimed.
    #[error("agent {agent} is not at cell {cell}")]
    AgentNotAtCell {
        /// The agent.
        agent: AgentId,
        /// The cell.
        cell: Position,
    },
}
