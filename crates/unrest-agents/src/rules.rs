//! Citizen and cop decision rules.
//!
//! A rule reads the grid and the agent collection and returns an [`Action`]
//! describing what the agent wants to do this tick. Rules never mutate
//! anything: the scheduler decides whether an action is committed right away
//! (interleaved policies) or after everyone has decided (snapshot policies).
//!
//! All arithmetic here is total. With no cops in view the arrest
//! probability is exactly zero, and the active count is floored at one so
//! the cop/active ratio is always defined.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use unrest_types::{AgentId, Condition, Position};
use unrest_world::HexGrid;

use crate::agent::{self, Agent, Citizen, Cop};

/// Model-wide constants consulted by the rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleParams {
    /// `k` in `1 - exp(-k * floor(C / A))`.
    pub arrest_prob_constant: f64,
    /// Longest sentence a cop can impose. Zero disables arrests.
    pub max_jail_term: u32,
    /// Whether agents relocate after deciding.
    pub movement: bool,
}

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

/// `hardship * (1 - legitimacy)`.
pub const fn grievance(hardship: f64, regime_legitimacy: f64) -> f64 {
    hardship * (1.0 - regime_legitimacy)
}

/// `1 - exp(-constant * floor(cops / max(actives, 1)))`.
///
/// The ratio is an integer division, so a citizen who sees fewer cops than
/// actives estimates zero risk.
pub fn arrest_probability(constant: f64, cops: u32, actives: u32) -> f64 {
    let ratio = cops.checked_div(actives.max(1)).unwrap_or(0);
    1.0 - (-constant * f64::from(ratio)).exp()
}

/// What an agent sees within its vision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Observation {
    /// Cops in view.
    pub cops: u32,
    /// Free, active citizens in view.
    pub actives: u32,
}

/// Count cops and active citizens within `vision` rings of `center`.
///
/// Jailed citizens are off the grid, so they never show up here.
pub fn observe(grid: &HexGrid, agents: &[Agent], center: Position, vision: u32) -> Observation {
    let mut seen = Observation::default();
    for (_, id) in grid.occupants(center, vision) {
        match agent::find(agents, id) {
            Some(Agent::Cop(_)) => seen.cops = seen.cops.saturating_add(1),
            Some(Agent::Citizen(c)) if c.is_active() => {
                seen.actives = seen.actives.saturating_add(1);
            }
            _ => {}
        }
    }
    seen
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// A citizen's decision for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CitizenAction {
    /// Grievance computed this tick.
    pub grievance: f64,
    /// Arrest probability estimated this tick.
    pub arrest_probability: f64,
    /// Quiescent or Active.
    pub condition: Condition,
    /// Empty cell to relocate to, if moving.
    pub move_to: Option<Position>,
}

/// A cop's decision for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CopAction {
    /// Jail an active citizen.
    Arrest {
        /// The citizen to jail.
        citizen: AgentId,
        /// Where the citizen was seen.
        cell: Position,
        /// Sentence length in ticks, `1..=max_jail_term`.
        sentence: u32,
        /// Whether the cop steps onto the citizen's vacated cell.
        follow: bool,
    },
    /// No arrest this tick.
    Patrol {
        /// Empty cell to relocate to, if moving.
        move_to: Option<Position>,
    },
}

/// Any agent's decision for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Nothing to do (jailed citizens).
    Idle,
    /// A citizen decision.
    Citizen(CitizenAction),
    /// A cop decision.
    Cop(CopAction),
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Decide what `agent` does this tick, given the world it observes.
///
/// `grid` and `agents` are the live world for interleaved policies and a
/// pre-tick copy for snapshot policies.
pub fn decide(
    agent: &Agent,
    grid: &HexGrid,
    agents: &[Agent],
    params: &RuleParams,
    rng: &mut impl Rng,
) -> Action {
    match agent {
        Agent::Citizen(citizen) => decide_citizen(citizen, grid, agents, params, rng),
        Agent::Cop(cop) => Action::Cop(decide_cop(cop, grid, agents, params, rng)),
    }
}

fn decide_citizen(
    citizen: &Citizen,
    grid: &HexGrid,
    agents: &[Agent],
    params: &RuleParams,
    rng: &mut impl Rng,
) -> Action {
    if citizen.is_jailed() {
        return Action::Idle;
    }

    let seen = observe(grid, agents, citizen.position, citizen.vision);
    // The citizen counts itself among the actives when it is rebelling.
    let actives = seen
        .actives
        .saturating_add(u32::from(citizen.is_active()));
    let arrest_probability = arrest_probability(params.arrest_prob_constant, seen.cops, actives);
    let grievance = grievance(citizen.hardship, citizen.regime_legitimacy);
    let net_risk = citizen.risk_aversion.mul_add(-arrest_probability, grievance);

    let condition = if net_risk > citizen.active_threshold {
        Condition::Active
    } else {
        Condition::Quiescent
    };

    let move_to = if params.movement {
        grid.empty_cells(citizen.position, citizen.vision)
            .choose(rng)
            .copied()
    } else {
        None
    };

    Action::Citizen(CitizenAction {
        grievance,
        arrest_probability,
        condition,
        move_to,
    })
}

fn decide_cop(
    cop: &Cop,
    grid: &HexGrid,
    agents: &[Agent],
    params: &RuleParams,
    rng: &mut impl Rng,
) -> CopAction {
    if params.max_jail_term > 0 {
        let targets: Vec<(Position, AgentId)> = grid
            .occupants(cop.position, cop.vision)
            .into_iter()
            .filter(|(_, id)| {
                agent::find(agents, *id)
                    .and_then(Agent::as_citizen)
                    .is_some_and(Citizen::is_active)
            })
            .collect();

        if let Some(&(cell, citizen)) = targets.choose(rng) {
            return CopAction::Arrest {
                citizen,
                cell,
                sentence: rng.random_range(1..=params.max_jail_term),
                follow: params.movement,
            };
        }
    }

    let move_to = if params.movement {
        grid.empty_cells(cop.position, cop.vision)
            .choose(rng)
            .copied()
    } else {
        None
    };
    CopAction::Patrol { move_to }
}
