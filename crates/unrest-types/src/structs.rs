//! Core record types: grid positions, per-tick aggregate summaries, and
//! per-agent export rows.

use serde::{Deserialize, Serialize};

use crate::enums::{Breed, Condition};
use crate::ids::AgentId;

/// A cell coordinate on the grid. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column index, `0..width`.
    pub x: u32,
    /// Row index, `0..height`.
    pub y: u32,
}

impl Position {
    /// Create a position from column and row.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Aggregate counts recorded at the end of every tick.
///
/// `quiescent + active + jailed + cops` always equals the number of agents
/// placed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickSummary {
    /// Number of completed steps when the summary was taken (0 = initial).
    pub tick: u64,
    /// Free citizens not rebelling.
    pub quiescent: u32,
    /// Free citizens rebelling.
    pub active: u32,
    /// Citizens serving a sentence.
    pub jailed: u32,
    /// Law-enforcement agents.
    pub cops: u32,
}

impl TickSummary {
    /// Total number of agents accounted for.
    pub const fn total(&self) -> u32 {
        self.quiescent
            .saturating_add(self.active)
            .saturating_add(self.jailed)
            .saturating_add(self.cops)
    }
}

/// One agent's exported state, for rendering or per-agent data collection.
///
/// Citizen-only fields are `None` for cops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// The agent's identifier.
    pub id: AgentId,
    /// Column of the agent's cell (last cell for jailed citizens).
    pub x: u32,
    /// Row of the agent's cell (last cell for jailed citizens).
    pub y: u32,
    /// Citizen or cop.
    pub breed: Breed,
    /// Remaining sentence in ticks.
    pub jail_sentence: Option<u32>,
    /// Behavioural state.
    pub condition: Option<Condition>,
    /// Last estimated arrest probability.
    pub arrest_probability: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_total_sums_all_counts() {
        let summary = TickSummary {
            tick: 3,
            quiescent: 10,
            active: 4,
            jailed: 2,
            cops: 1,
        };
        assert_eq!(summary.total(), 17);
    }

    #[test]
    fn cop_record_omits_citizen_fields() {
        let record = AgentRecord {
            id: AgentId::new(1),
            x: 2,
            y: 3,
            breed: Breed::Cop,
            jail_sentence: None,
            condition: None,
            arrest_probability: None,
        };
        let json = serde_json::to_value(&record).unwrap_or_default();
        assert_eq!(json.get("breed").and_then(|b| b.as_str()), Some("cop"));
        assert!(json.get("condition").is_some_and(serde_json::Value::is_null));
    }

    #[test]
    fn position_display() {
        assert_eq!(Position::new(4, 7).to_string(), "(4, 7)");
    }
}
