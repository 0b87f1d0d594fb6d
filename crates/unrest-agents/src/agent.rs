//! Agent variants and lookups.
//!
//! The population is a flat `Vec<Agent>` owned by the orchestrator, stored
//! in placement order. Because identifiers are assigned sequentially during
//! placement, an agent's id doubles as its index; [`find`] relies on that
//! and falls back to a scan when the two disagree.

use serde::{Deserialize, Serialize};

use unrest_types::{AgentId, AgentRecord, Breed, Condition, Position};

use crate::rules::grievance;

/// Fixed per-citizen traits drawn once at placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CitizenTraits {
    /// Economic hardship, `[0, 1]`.
    pub hardship: f64,
    /// Perceived legitimacy of the regime, `[0, 1]`.
    pub regime_legitimacy: f64,
    /// Aversion to the risk of arrest, `[0, 1]`.
    pub risk_aversion: f64,
}

/// A member of the population who may rebel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citizen {
    /// Identifier.
    pub id: AgentId,
    /// Current cell, or the last cell held before arrest.
    pub position: Position,
    /// Number of hex rings inspected.
    pub vision: u32,
    /// Economic hardship, fixed for the run.
    pub hardship: f64,
    /// Perceived legitimacy; only the aid shock changes it.
    pub regime_legitimacy: f64,
    /// Aversion to arrest risk, fixed for the run.
    pub risk_aversion: f64,
    /// Net-risk level above which the citizen turns active.
    pub active_threshold: f64,
    /// `hardship * (1 - regime_legitimacy)`, refreshed every tick.
    pub grievance: f64,
    /// Estimated chance of arrest, refreshed every tick.
    pub arrest_probability: f64,
    /// Behavioural state.
    pub condition: Condition,
    /// Remaining ticks in jail, 0 when free.
    pub jail_sentence: u32,
    /// Iteration during which the current sentence was imposed.
    pub jailed_at: Option<u64>,
}

impl Citizen {
    /// Create a quiescent citizen. Traits are clamped into `[0, 1]`.
    pub fn new(
        id: AgentId,
        position: Position,
        vision: u32,
        traits: CitizenTraits,
        active_threshold: f64,
    ) -> Self {
        let hardship = clamp_unit(traits.hardship);
        let regime_legitimacy = clamp_unit(traits.regime_legitimacy);
        Self {
            id,
            position,
            vision,
            hardship,
            regime_legitimacy,
            risk_aversion: clamp_unit(traits.risk_aversion),
            active_threshold,
            grievance: grievance(hardship, regime_legitimacy),
            arrest_probability: 0.0,
            condition: Condition::Quiescent,
            jail_sentence: 0,
            jailed_at: None,
        }
    }

    /// Whether the citizen is serving a sentence.
    pub const fn is_jailed(&self) -> bool {
        matches!(self.condition, Condition::Jailed)
    }

    /// Whether the citizen is free and rebelling.
    pub const fn is_active(&self) -> bool {
        matches!(self.condition, Condition::Active)
    }
}

/// A law-enforcement agent. Stateless apart from where it stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cop {
    /// Identifier.
    pub id: AgentId,
    /// Current cell.
    pub position: Position,
    /// Number of hex rings inspected.
    pub vision: u32,
}

impl Cop {
    /// Create a cop.
    pub const fn new(id: AgentId, position: Position, vision: u32) -> Self {
        Self {
            id,
            position,
            vision,
        }
    }
}

/// Any agent in the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "breed", rename_all = "lowercase")]
pub enum Agent {
    /// A citizen.
    Citizen(Citizen),
    /// A cop.
    Cop(Cop),
}

impl Agent {
    /// The agent's identifier.
    pub const fn id(&self) -> AgentId {
        match self {
            Self::Citizen(c) => c.id,
            Self::Cop(c) => c.id,
        }
    }

    /// Current cell, or last cell for a jailed citizen.
    pub const fn position(&self) -> Position {
        match self {
            Self::Citizen(c) => c.position,
            Self::Cop(c) => c.position,
        }
    }

    /// Record a new cell after the grid accepted the move.
    pub const fn set_position(&mut self, position: Position) {
        match self {
            Self::Citizen(c) => c.position = position,
            Self::Cop(c) => c.position = position,
        }
    }

    /// Citizen or cop.
    pub const fn breed(&self) -> Breed {
        match self {
            Self::Citizen(_) => Breed::Citizen,
            Self::Cop(_) => Breed::Cop,
        }
    }

    /// Vision radius in rings.
    pub const fn vision(&self) -> u32 {
        match self {
            Self::Citizen(c) => c.vision,
            Self::Cop(c) => c.vision,
        }
    }

    /// Whether the agent currently occupies a grid cell.
    pub const fn is_on_grid(&self) -> bool {
        match self {
            Self::Citizen(c) => !c.is_jailed(),
            Self::Cop(_) => true,
        }
    }

    /// Borrow the citizen state, if this is a citizen.
    pub const fn as_citizen(&self) -> Option<&Citizen> {
        match self {
            Self::Citizen(c) => Some(c),
            Self::Cop(_) => None,
        }
    }

    /// Mutably borrow the citizen state, if this is a citizen.
    pub const fn as_citizen_mut(&mut self) -> Option<&mut Citizen> {
        match self {
            Self::Citizen(c) => Some(c),
            Self::Cop(_) => None,
        }
    }

    /// Export row for rendering and per-agent data collection.
    pub fn record(&self) -> AgentRecord {
        let position = self.position();
        let (jail_sentence, condition, arrest_probability) = match self {
            Self::Citizen(c) => (
                Some(c.jail_sentence),
                Some(c.condition),
                Some(c.arrest_probability),
            ),
            Self::Cop(_) => (None, None, None),
        };
        AgentRecord {
            id: self.id(),
            x: position.x,
            y: position.y,
            breed: self.breed(),
            jail_sentence,
            condition,
            arrest_probability,
        }
    }
}

/// Look up an agent by id.
pub fn find(agents: &[Agent], id: AgentId) -> Option<&Agent> {
    let direct = id.index().and_then(|i| agents.get(i));
    match direct {
        Some(agent) if agent.id() == id => Some(agent),
        _ => agents.iter().find(|a| a.id() == id),
    }
}

/// Look up an agent by id, mutably.
pub fn find_mut(agents: &mut [Agent], id: AgentId) -> Option<&mut Agent> {
    let slot = id
        .index()
        .filter(|&i| agents.get(i).is_some_and(|a| a.id() == id));
    match slot {
        Some(i) => agents.get_mut(i),
        None => agents.iter_mut().find(|a| a.id() == id),
    }
}

/// Clamp a trait value into `[0, 1]`, mapping NaN to 0.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn citizen(id: u64) -> Citizen {
        Citizen::new(
            AgentId::new(id),
            Position::new(1, 2),
            3,
            CitizenTraits {
                hardship: 0.8,
                regime_legitimacy: 0.25,
                risk_aversion: 0.5,
            },
            0.1,
        )
    }

    #[test]
    fn new_citizen_is_quiescent_with_grievance() {
        let c = citizen(0);
        assert_eq!(c.condition, Condition::Quiescent);
        assert_eq!(c.jail_sentence, 0);
        assert!((c.grievance - 0.6).abs() < 1e-12);
    }

    #[test]
    fn traits_are_clamped() {
        let c = Citizen::new(
            AgentId::new(0),
            Position::new(0, 0),
            1,
            CitizenTraits {
                hardship: 1.5,
                regime_legitimacy: -0.2,
                risk_aversion: f64::NAN,
            },
            0.1,
        );
        assert!((c.hardship - 1.0).abs() < f64::EPSILON);
        assert!(c.regime_legitimacy.abs() < f64::EPSILON);
        assert!(c.risk_aversion.abs() < f64::EPSILON);
    }

    #[test]
    fn cop_record_has_no_citizen_fields() {
        let cop = Agent::Cop(Cop::new(AgentId::new(4), Position::new(3, 3), 7));
        let record = cop.record();
        assert_eq!(record.breed, Breed::Cop);
        assert_eq!(record.condition, None);
        assert_eq!(record.jail_sentence, None);
        assert_eq!((record.x, record.y), (3, 3));
    }

    #[test]
    fn jailed_citizen_is_off_grid() {
        let mut c = citizen(0);
        c.condition = Condition::Jailed;
        let agent = Agent::Citizen(c);
        assert!(!agent.is_on_grid());
        assert_eq!(agent.record().condition, Some(Condition::Jailed));
    }

    #[test]
    fn agent_json_is_tagged_by_breed() {
        let cop = Agent::Cop(Cop::new(AgentId::new(4), Position::new(3, 3), 7));
        let value = serde_json::to_value(&cop).unwrap();
        assert_eq!(value.get("breed").and_then(serde_json::Value::as_str), Some("cop"));
        assert_eq!(value.get("vision").and_then(serde_json::Value::as_u64), Some(7));

        let mut jailed = citizen(2);
        jailed.condition = Condition::Jailed;
        jailed.jail_sentence = 6;
        let json = serde_json::to_string(&Agent::Citizen(jailed)).unwrap();
        assert!(json.contains(r#""breed":"citizen""#));
        let back: Agent = serde_json::from_str(&json).unwrap();
        assert!(!back.is_on_grid());
        assert_eq!(back.record().jail_sentence, Some(6));
    }

    #[test]
    fn find_uses_index_and_falls_back_to_scan() {
        let mut agents = vec![
            Agent::Citizen(citizen(0)),
            Agent::Cop(Cop::new(AgentId::new(1), Position::new(0, 0), 1)),
        ];
        assert_eq!(find(&agents, AgentId::new(1)).map(Agent::breed), Some(Breed::Cop));

        agents.swap(0, 1);
        assert_eq!(find(&agents, AgentId::new(1)).map(Agent::breed), Some(Breed::Cop));
        assert!(find(&agents, AgentId::new(9)).is_none());

        if let Some(agent) = find_mut(&mut agents, AgentId::new(0)) {
            agent.set_position(Position::new(5, 5));
        }
        assert_eq!(
            find(&agents, AgentId::new(0)).map(Agent::position),
            Some(Position::new(5, 5))
        );
    }
}
