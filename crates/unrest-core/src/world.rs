//! The mutable simulation state: grid plus population.
//!
//! [`World`] is the single place where decided [`Action`]s turn into state
//! changes. Every grid mutation is validated by the grid; a rejected
//! mutation is logged and skipped, never propagated, so a tick always
//! completes.
//!
//! Conflicts only arise when actions were decided against a snapshot and
//! committed later:
//!
//! - a move onto a cell taken earlier in the commit is dropped;
//! - an arrest of a citizen already jailed earlier in the commit is
//!   dropped, and the cop stays where it is;
//! - an arrest still commits if the citizen's own action turned it
//!   Quiescent, because the cop saw it Active;
//! - a cop only follows onto the cell it saw the citizen on; if the citizen
//!   moved away earlier in the commit, the arrest stands and the cop stays.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use unrest_agents::agent;
use unrest_agents::jail::{self, JailTick};
use unrest_agents::rules::{self, Action, CitizenAction, CopAction, RuleParams};
use unrest_agents::Agent;
use unrest_types::{AgentId, Condition, Position, TickSummary};
use unrest_world::{HexGrid, WorldError};

/// What happened when an action was committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// Nothing to do.
    Idle,
    /// The action took effect.
    Applied,
    /// A citizen was jailed.
    Arrested(AgentId),
    /// The action, or its move, was dropped because the world changed
    /// since it was decided.
    Conflict,
}

/// Grid and population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    /// Cell occupancy. Jailed citizens are not on it.
    pub grid: HexGrid,
    /// Every agent, in placement order.
    pub agents: Vec<Agent>,
}

impl World {
    /// Build a world from a grid and a population, placing every agent that
    /// is not jailed on its recorded cell.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError`] if an agent is off the grid or two agents
    /// claim the same cell.
    pub fn new(mut grid: HexGrid, agents: Vec<Agent>) -> Result<Self, WorldError> {
        for a in agents.iter().filter(|a| a.is_on_grid()) {
            grid.place(a.id(), a.position())?;
        }
        Ok(Self { grid, agents })
    }

    /// Commit one agent's decided action.
    pub fn apply(&mut self, id: AgentId, action: &Action, tick: u64) -> Commit {
        match action {
            Action::Idle => Commit::Idle,
            Action::Citizen(decision) => self.apply_citizen(id, decision),
            Action::Cop(CopAction::Arrest {
                citizen,
                cell,
                sentence,
                follow,
            }) => self.apply_arrest(id, *citizen, *cell, *sentence, *follow, tick),
            Action::Cop(CopAction::Patrol { move_to }) => match move_to {
                Some(target) => self.relocate(id, *target),
                None => Commit::Applied,
            },
        }
    }

    fn apply_citizen(&mut self, id: AgentId, decision: &CitizenAction) -> Commit {
        let Some(citizen) = agent::find_mut(&mut self.agents, id).and_then(Agent::as_citizen_mut)
        else {
            warn!(agent = %id, "citizen action for unknown citizen, skipping");
            return Commit::Conflict;
        };
        // Arrested earlier in this commit.
        if citizen.is_jailed() {
            return Commit::Conflict;
        }

        citizen.grievance = decision.grievance;
        citizen.arrest_probability = decision.arrest_probability;
        citizen.condition = decision.condition;

        match decision.move_to {
            Some(target) => self.relocate(id, target),
            None => Commit::Applied,
        }
    }

    fn apply_arrest(
        &mut self,
        cop: AgentId,
        target: AgentId,
        seen_at: Position,
        sentence: u32,
        follow: bool,
        tick: u64,
    ) -> Commit {
        let Some(citizen) =
            agent::find_mut(&mut self.agents, target).and_then(Agent::as_citizen_mut)
        else {
            warn!(cop = %cop, target = %target, "arrest target is not a citizen, skipping");
            return Commit::Conflict;
        };
        if citizen.is_jailed() {
            trace!(cop = %cop, target = %target, "arrest target already jailed");
            return Commit::Conflict;
        }

        let cell = citizen.position;
        if let Err(e) = self.grid.remove(target, cell) {
            warn!(cop = %cop, target = %target, error = %e, "arrest skipped");
            return Commit::Conflict;
        }
        jail::imprison(citizen, sentence, tick);
        trace!(cop = %cop, citizen = %target, cell = %cell, sentence, "arrest");

        if follow {
            if cell == seen_at {
                self.relocate(cop, cell);
            } else {
                trace!(cop = %cop, seen_at = %seen_at, cell = %cell, "target moved, cop stays");
            }
        }
        Commit::Arrested(target)
    }

    /// Move an agent onto `target`, dropping the move if the grid refuses.
    fn relocate(&mut self, id: AgentId, target: Position) -> Commit {
        let Some(mover) = agent::find_mut(&mut self.agents, id) else {
            warn!(agent = %id, "move for unknown agent, skipping");
            return Commit::Conflict;
        };
        let from = mover.position();
        match self.grid.move_agent(id, from, target) {
            Ok(()) => {
                mover.set_position(target);
                Commit::Applied
            }
            Err(WorldError::CellOccupied { .. }) => {
                trace!(agent = %id, from = %from, to = %target, "move target taken, staying");
                Commit::Conflict
            }
            Err(e) => {
                warn!(agent = %id, from = %from, to = %target, error = %e, "move skipped");
                Commit::Conflict
            }
        }
    }

    /// Recompute grievance and arrest probability for every free citizen
    /// from the current state.
    pub fn refresh_citizens(&mut self, params: &RuleParams) {
        let updates: Vec<(usize, f64, f64)> = self
            .agents
            .iter()
            .enumerate()
            .filter_map(|(i, a)| a.as_citizen().map(|c| (i, c)))
            .filter(|(_, c)| !c.is_jailed())
            .map(|(i, c)| {
                let seen = rules::observe(&self.grid, &self.agents, c.position, c.vision);
                let actives = seen.actives.saturating_add(u32::from(c.is_active()));
                (
                    i,
                    rules::grievance(c.hardship, c.regime_legitimacy),
                    rules::arrest_probability(params.arrest_prob_constant, seen.cops, actives),
                )
            })
            .collect();

        for (i, grievance, arrest_probability) in updates {
            if let Some(c) = self.agents.get_mut(i).and_then(Agent::as_citizen_mut) {
                c.grievance = grievance;
                c.arrest_probability = arrest_probability;
            }
        }
    }

    /// Advance every sentence by one tick and put released citizens back
    /// on the grid. Returns the number released.
    pub fn jail_countdown(&mut self, tick: u64, rng: &mut impl Rng) -> u32 {
        let mut released: u32 = 0;
        for citizen in self.agents.iter_mut().filter_map(Agent::as_citizen_mut) {
            if jail::serve(citizen, tick) != JailTick::Released {
                continue;
            }
            let placed = jail::release_cell(&self.grid, citizen, rng)
                .map(|cell| self.grid.place(citizen.id, cell).map(|()| cell));
            match placed {
                Some(Ok(cell)) => {
                    citizen.position = cell;
                    released = released.saturating_add(1);
                    trace!(citizen = %citizen.id, cell = %cell, "released");
                }
                Some(Err(e)) => {
                    warn!(citizen = %citizen.id, error = %e, "release placement failed, holding over");
                    jail::hold_over(citizen);
                }
                None => {
                    warn!(citizen = %citizen.id, "no free cell for released citizen, holding over");
                    jail::hold_over(citizen);
                }
            }
        }
        if released > 0 {
            debug!(tick, released, "citizens released from jail");
        }
        released
    }

    /// Aggregate counts for the end of `tick`.
    pub fn summary(&self, tick: u64) -> TickSummary {
        let mut summary = TickSummary {
            tick,
            ..TickSummary::default()
        };
        for a in &self.agents {
            let slot = match a {
                Agent::Cop(_) => &mut summary.cops,
                Agent::Citizen(c) => match c.condition {
                    Condition::Quiescent => &mut summary.quiescent,
                    Condition::Active => &mut summary.active,
                    Condition::Jailed => &mut summary.jailed,
                },
            };
            *slot = slot.saturating_add(1);
        }
        summary
    }

    /// Whether the grid and the population agree: every agent on the grid
    /// sits where it says, jailed citizens are absent, and nothing else is
    /// on the grid.
    pub fn is_consistent(&self) -> bool {
        let mut on_grid: usize = 0;
        for a in &self.agents {
            let here = self.grid.occupant(a.position()) == Some(a.id());
            if a.is_on_grid() {
                if !here {
                    return false;
                }
                on_grid = on_grid.saturating_add(1);
            } else if here {
                return false;
            }
        }
        on_grid == self.grid.occupied_count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use unrest_agents::{Citizen, CitizenTraits, Cop};

    use super::*;

    fn citizen(id: u64, x: u32, y: u32) -> Agent {
        Agent::Citizen(Citizen::new(
            AgentId::new(id),
            Position::new(x, y),
            1,
            CitizenTraits {
                hardship: 1.0,
                regime_legitimacy: 0.0,
                risk_aversion: 0.0,
            },
            0.1,
        ))
    }

    fn cop(id: u64, x: u32, y: u32) -> Agent {
        Agent::Cop(Cop::new(AgentId::new(id), Position::new(x, y), 1))
    }

    fn world(agents: Vec<Agent>) -> World {
        World::new(HexGrid::new(5, 5).unwrap(), agents).unwrap()
    }

    fn condition(world: &World, id: u64) -> Option<Condition> {
        agent::find(&world.agents, AgentId::new(id))
            .and_then(Agent::as_citizen)
            .map(|c| c.condition)
    }

    /// Arrest of a citizen seen on (2, 2).
    fn arrest(target: u64, sentence: u32) -> Action {
        Action::Cop(CopAction::Arrest {
            citizen: AgentId::new(target),
            cell: Position::new(2, 2),
            sentence,
            follow: true,
        })
    }

    #[test]
    fn overlapping_population_rejected() {
        let result = World::new(
            HexGrid::new(3, 3).unwrap(),
            vec![citizen(0, 1, 1), cop(1, 1, 1)],
        );
        assert!(matches!(result, Err(WorldError::CellOccupied { .. })));
    }

    #[test]
    fn arrest_jails_citizen_and_cop_follows() {
        let mut w = world(vec![citizen(0, 2, 2), cop(1, 3, 2)]);
        let commit = w.apply(AgentId::new(1), &arrest(0, 4), 0);

        assert_eq!(commit, Commit::Arrested(AgentId::new(0)));
        assert_eq!(condition(&w, 0), Some(Condition::Jailed));
        assert_eq!(w.grid.occupant(Position::new(2, 2)), Some(AgentId::new(1)));
        assert!(w.grid.is_empty(Position::new(3, 2)));
        assert!(w.is_consistent());
    }

    #[test]
    fn cop_does_not_chase_a_target_that_moved_during_commit() {
        let mut w = world(vec![citizen(0, 2, 2), cop(1, 3, 2)]);
        let step_away = Action::Citizen(CitizenAction {
            grievance: 1.0,
            arrest_probability: 0.0,
            condition: Condition::Active,
            move_to: Some(Position::new(0, 4)),
        });
        assert_eq!(w.apply(AgentId::new(0), &step_away, 0), Commit::Applied);

        let commit = w.apply(AgentId::new(1), &arrest(0, 3), 0);
        assert_eq!(commit, Commit::Arrested(AgentId::new(0)));
        assert_eq!(condition(&w, 0), Some(Condition::Jailed));
        assert_eq!(w.grid.occupant(Position::new(3, 2)), Some(AgentId::new(1)));
        assert!(w.grid.is_empty(Position::new(0, 4)));
        assert!(w.grid.is_empty(Position::new(2, 2)));
        assert!(w.is_consistent());
    }

    #[test]
    fn second_arrest_of_same_citizen_is_dropped() {
        let mut w = world(vec![citizen(0, 2, 2), cop(1, 3, 2), cop(2, 1, 2)]);
        w.apply(AgentId::new(1), &arrest(0, 4), 0);
        let commit = w.apply(AgentId::new(2), &arrest(0, 9), 0);

        assert_eq!(commit, Commit::Conflict);
        assert_eq!(w.grid.occupant(Position::new(1, 2)), Some(AgentId::new(2)));
        let sentence = agent::find(&w.agents, AgentId::new(0))
            .and_then(Agent::as_citizen)
            .map(|c| c.jail_sentence);
        assert_eq!(sentence, Some(4));
    }

    #[test]
    fn jailed_citizen_ignores_its_own_action() {
        let mut w = world(vec![citizen(0, 2, 2), cop(1, 3, 2)]);
        w.apply(AgentId::new(1), &arrest(0, 4), 0);
        let own = Action::Citizen(CitizenAction {
            grievance: 1.0,
            arrest_probability: 0.0,
            condition: Condition::Quiescent,
            move_to: Some(Position::new(0, 0)),
        });
        assert_eq!(w.apply(AgentId::new(0), &own, 0), Commit::Conflict);
        assert_eq!(condition(&w, 0), Some(Condition::Jailed));
        assert!(w.is_consistent());
    }

    #[test]
    fn move_onto_taken_cell_is_dropped() {
        let mut w = world(vec![citizen(0, 0, 0), citizen(1, 1, 0)]);
        let action = Action::Citizen(CitizenAction {
            grievance: 1.0,
            arrest_probability: 0.0,
            condition: Condition::Active,
            move_to: Some(Position::new(1, 0)),
        });
        assert_eq!(w.apply(AgentId::new(0), &action, 0), Commit::Conflict);
        // The condition change still lands.
        assert_eq!(condition(&w, 0), Some(Condition::Active));
        assert_eq!(w.grid.occupant(Position::new(0, 0)), Some(AgentId::new(0)));
    }

    #[test]
    fn countdown_releases_onto_recorded_cell() {
        let mut w = world(vec![citizen(0, 2, 2), cop(1, 3, 2)]);
        let mut rng = SmallRng::seed_from_u64(42);
        let no_follow = Action::Cop(CopAction::Arrest {
            citizen: AgentId::new(0),
            cell: Position::new(2, 2),
            sentence: 2,
            follow: false,
        });
        w.apply(AgentId::new(1), &no_follow, 0);

        assert_eq!(w.jail_countdown(0, &mut rng), 0);
        assert_eq!(w.summary(1).jailed, 1);
        assert_eq!(w.jail_countdown(1, &mut rng), 0);
        assert_eq!(w.summary(2).jailed, 1);
        assert_eq!(w.jail_countdown(2, &mut rng), 1);
        assert_eq!(condition(&w, 0), Some(Condition::Quiescent));
        assert_eq!(w.grid.occupant(Position::new(2, 2)), Some(AgentId::new(0)));
        assert!(w.is_consistent());
    }

    #[test]
    fn refresh_updates_free_citizens() {
        let mut w = world(vec![citizen(0, 2, 2), cop(1, 3, 2)]);
        let params = RuleParams {
            arrest_prob_constant: 2.3,
            max_jail_term: 10,
            movement: false,
        };
        w.refresh_citizens(&params);
        let c = agent::find(&w.agents, AgentId::new(0))
            .and_then(Agent::as_citizen)
            .unwrap();
        assert!((c.grievance - 1.0).abs() < f64::EPSILON);
        assert!((c.arrest_probability - (1.0 - (-2.3_f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn snapshot_restores_a_consistent_world() {
        let mut w = world(vec![citizen(0, 2, 2), cop(1, 3, 2), citizen(2, 0, 0)]);
        w.apply(AgentId::new(1), &arrest(0, 4), 0);

        let json = serde_json::to_string(&w).unwrap();
        let restored: World = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, w);
        assert!(restored.is_consistent());
        assert!(restored.grid.is_empty(Position::new(3, 2)));
        assert_eq!(restored.summary(1), w.summary(1));
    }

    #[test]
    fn summary_counts_each_agent_once() {
        let mut w = world(vec![citizen(0, 0, 0), citizen(1, 1, 0), cop(2, 2, 0)]);
        if let Some(c) = w.agents.get_mut(1).and_then(Agent::as_citizen_mut) {
            c.condition = Condition::Active;
        }
        let s = w.summary(3);
        assert_eq!(s.tick, 3);
        assert_eq!((s.quiescent, s.active, s.jailed, s.cops), (1, 1, 0, 1));
        assert_eq!(s.total(), 3);
    }
}
