//! The simulation orchestrator.
//!
//! [`Model`] owns the grid, the population, the scheduler, the aid shock and
//! the run's single random source. Nothing outside it mutates agent or cell
//! state. Each [`Model::step`] runs:
//!
//! 1. refresh grievance and arrest probability for every free citizen;
//! 2. fire the aid shock if its tick has been reached;
//! 3. let the scheduler decide and commit agent actions;
//! 4. count down jail sentences and re-place released citizens;
//! 5. aggregate and record the tick summary;
//! 6. advance the iteration counter and update `running`.
//!
//! Given the same configuration (seed included) a run is fully
//! reproducible.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use unrest_agents::rules::Action;
use unrest_agents::{Agent, AidShock, Citizen, CitizenTraits, Cop, Legitimacy};
use unrest_types::{AgentId, AgentRecord, SchedulerKind, TickSummary};
use unrest_world::HexGrid;

use crate::config::{ConfigError, ModelConfig, ResolvedConfig};
use crate::scheduler::Scheduler;
use crate::world::World;

/// A configured civil-violence run.
#[derive(Debug, Clone)]
pub struct Model {
    config: ModelConfig,
    resolved: ResolvedConfig,
    world: World,
    scheduler: Scheduler,
    shock: AidShock,
    rng: SmallRng,
    iteration: u64,
    running: bool,
    history: Vec<TickSummary>,
}

impl Model {
    /// Validate `config`, populate the grid, and record the tick-0 summary.
    ///
    /// Every cell is visited once in row-major order. A cell receives a cop
    /// with probability `cop_density`; otherwise a second draw below
    /// `cop_density + citizen_density` gives it a citizen with uniform
    /// hardship and risk aversion and a legitimacy drawn from the
    /// configured distribution.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for any invalid setting.
    pub fn new(config: &ModelConfig) -> Result<Self, ConfigError> {
        let resolved = config.resolve()?;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let grid = HexGrid::new(config.width, config.height)?;
        let agents = populate(&grid, config, &resolved.legitimacy, &mut rng);
        Self::assemble(config, resolved, grid, agents, rng)
    }

    /// Build a run over a hand-placed population instead of a random one.
    ///
    /// Agents are registered with the scheduler in the order given. The
    /// densities in `config` are still validated but not used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for invalid settings, duplicate agent ids,
    /// or agents that are off the grid or share a cell.
    pub fn from_population(config: &ModelConfig, agents: Vec<Agent>) -> Result<Self, ConfigError> {
        let resolved = config.resolve()?;
        let mut seen = std::collections::BTreeSet::new();
        for a in &agents {
            if !seen.insert(a.id()) {
                return Err(ConfigError::DuplicateAgent(a.id()));
            }
        }
        let rng = SmallRng::seed_from_u64(config.seed);
        let grid = HexGrid::new(config.width, config.height)?;
        Self::assemble(config, resolved, grid, agents, rng)
    }

    fn assemble(
        config: &ModelConfig,
        resolved: ResolvedConfig,
        grid: HexGrid,
        agents: Vec<Agent>,
        rng: SmallRng,
    ) -> Result<Self, ConfigError> {
        let world = World::new(grid, agents)?;

        let mut scheduler = Scheduler::new(resolved.scheduler);
        for a in &world.agents {
            scheduler.add(a.id());
        }

        let initial = world.summary(0);
        info!(
            width = config.width,
            height = config.height,
            seed = config.seed,
            scheduler = %resolved.scheduler,
            citizens = initial.quiescent.saturating_add(initial.active),
            cops = initial.cops,
            "Model constructed"
        );

        Ok(Self {
            config: config.clone(),
            shock: AidShock::new(resolved.aid, config.shock_amount, config.shock_tick),
            resolved,
            world,
            scheduler,
            rng,
            iteration: 0,
            running: true,
            history: vec![initial],
        })
    }

    /// Advance the model by one tick and return the recorded summary.
    ///
    /// Every free citizen's grievance and arrest probability are first
    /// refreshed from the tick-start state. A citizen that then takes its
    /// turn overwrites both with the values it decided on (live world under
    /// interleaved policies, pre-tick world otherwise), so the refreshed
    /// estimate only survives on citizens arrested before their turn.
    ///
    /// Stepping always advances, even after `is_running` turned false;
    /// stopping is the caller's decision.
    pub fn step(&mut self) -> TickSummary {
        let tick = self.iteration;
        let rules = self.resolved.rules;

        self.world.refresh_citizens(&rules);

        if self.shock.is_due(tick) && self.shock.apply(&mut self.world.agents) {
            info!(
                tick,
                direction = ?self.shock.direction,
                amount = self.shock.amount,
                "Aid shock applied"
            );
        }

        let activation = self
            .scheduler
            .activate(&mut self.world, &rules, &mut self.rng, tick);
        let released = self.world.jail_countdown(tick, &mut self.rng);

        self.iteration = self.iteration.saturating_add(1);
        let summary = self.world.summary(self.iteration);
        self.history.push(summary);
        if self.iteration > self.config.max_iters {
            self.running = false;
        }

        debug!(
            tick = summary.tick,
            quiescent = summary.quiescent,
            active = summary.active,
            jailed = summary.jailed,
            arrests = activation.arrests,
            conflicts = activation.conflicts,
            released,
            "Tick complete"
        );
        debug_assert!(self.world.is_consistent(), "grid and agents out of sync");

        summary
    }

    /// Whether the iteration count is still within `max_iters`.
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Completed steps.
    pub const fn iteration(&self) -> u64 {
        self.iteration
    }

    /// The configuration this run was built from.
    pub const fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// The active scheduling policy.
    pub const fn scheduler_kind(&self) -> SchedulerKind {
        self.scheduler.kind()
    }

    /// The aid shock and whether it has fired.
    pub const fn shock(&self) -> &AidShock {
        &self.shock
    }

    /// Counts for the current state.
    pub fn summary(&self) -> TickSummary {
        self.world.summary(self.iteration)
    }

    /// Every recorded summary, starting with tick 0.
    pub fn history(&self) -> &[TickSummary] {
        &self.history
    }

    /// The population, in placement order.
    pub fn agents(&self) -> &[Agent] {
        &self.world.agents
    }

    /// Scheduler membership, in insertion order.
    pub fn scheduled(&self) -> &[AgentId] {
        self.scheduler.agents()
    }

    /// The grid.
    pub const fn grid(&self) -> &HexGrid {
        &self.world.grid
    }

    /// Row-major cell occupancy for rendering.
    pub fn occupancy(&self) -> &[Option<AgentId>] {
        self.world.grid.occupancy()
    }

    /// Export rows for every agent.
    pub fn agent_records(&self) -> Vec<AgentRecord> {
        self.world.agents.iter().map(Agent::record).collect()
    }

    /// Actions decided in the last tick under the `Staged` policy.
    pub fn pending_actions(&self) -> &[(AgentId, Action)] {
        self.scheduler.pending()
    }
}

/// Visit every cell once and draw its occupant.
fn populate(
    grid: &HexGrid,
    config: &ModelConfig,
    legitimacy: &Legitimacy,
    rng: &mut impl Rng,
) -> Vec<Agent> {
    let citizen_cutoff = config.cop_density + config.citizen_density;
    let mut agents = Vec::new();
    let mut next_id: u64 = 0;

    for cell in grid.cells() {
        let id = AgentId::new(next_id);
        let occupant = if rng.random::<f64>() < config.cop_density {
            Some(Agent::Cop(Cop::new(id, cell, config.cop_vision)))
        } else if rng.random::<f64>() < citizen_cutoff {
            let hardship = rng.random::<f64>();
            let regime_legitimacy = legitimacy.sample(rng);
            let risk_aversion = rng.random::<f64>();
            Some(Agent::Citizen(Citizen::new(
                id,
                cell,
                config.citizen_vision,
                CitizenTraits {
                    hardship,
                    regime_legitimacy,
                    risk_aversion,
                },
                config.active_threshold,
            )))
        } else {
            None
        };

        if let Some(agent) = occupant {
            agents.push(agent);
            next_id = next_id.saturating_add(1);
        }
    }
    agents
}
