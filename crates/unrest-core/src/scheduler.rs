//! Activation policies.
//!
//! The scheduler decides in what order agents act and when their mutations
//! become visible to each other:
//!
//! | policy | order | consistency |
//! |--------|-------|-------------|
//! | `Random` | reshuffled every tick | interleaved |
//! | `Sequential` | insertion order | interleaved |
//! | `Simultaneous` | insertion order | snapshot |
//! | `Staged` | insertion order | snapshot, pending actions kept |
//!
//! Interleaved policies decide and commit one agent at a time against the
//! live world. Snapshot policies decide every agent against the pre-tick
//! world and only then commit, in membership order, so no decision can see
//! another agent's same-tick mutation.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::trace;

use unrest_agents::agent;
use unrest_agents::rules::{self, Action, RuleParams};
use unrest_types::{AgentId, SchedulerKind};

use crate::world::{Commit, World};

/// Counts from one activation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Activation {
    /// Agents that decided something other than idling.
    pub acted: u32,
    /// Arrests committed.
    pub arrests: u32,
    /// Actions or moves dropped because the world changed under them.
    pub conflicts: u32,
}

impl Activation {
    fn record(&mut self, action: &Action, commit: Commit) {
        if !matches!(action, Action::Idle) {
            self.acted = self.acted.saturating_add(1);
        }
        match commit {
            Commit::Arrested(_) => self.arrests = self.arrests.saturating_add(1),
            Commit::Conflict => self.conflicts = self.conflicts.saturating_add(1),
            Commit::Idle | Commit::Applied => {}
        }
    }
}

/// An activation policy and its membership list.
#[derive(Debug, Clone)]
pub struct Scheduler {
    kind: SchedulerKind,
    members: Vec<AgentId>,
    pending: Vec<(AgentId, Action)>,
}

impl Scheduler {
    /// Create an empty scheduler with the given policy.
    pub const fn new(kind: SchedulerKind) -> Self {
        Self {
            kind,
            members: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// The active policy.
    pub const fn kind(&self) -> SchedulerKind {
        self.kind
    }

    /// Register an agent. Agents are never removed.
    pub fn add(&mut self, id: AgentId) {
        self.members.push(id);
    }

    /// Membership in insertion order.
    pub fn agents(&self) -> &[AgentId] {
        &self.members
    }

    /// Actions decided in the last `Staged` tick. Empty for other policies.
    pub fn pending(&self) -> &[(AgentId, Action)] {
        &self.pending
    }

    /// Run one tick of agent decisions and commit them to `world`.
    pub fn activate(
        &mut self,
        world: &mut World,
        params: &RuleParams,
        rng: &mut impl Rng,
        tick: u64,
    ) -> Activation {
        if self.kind.is_interleaved() {
            if self.kind == SchedulerKind::Random {
                let mut order = self.members.clone();
                order.shuffle(rng);
                return interleaved(&order, world, params, rng, tick);
            }
            return interleaved(&self.members, world, params, rng, tick);
        }

        let intents = decide_all(&self.members, world, params, rng);
        if self.kind == SchedulerKind::Staged {
            // Decide pass done; keep it inspectable across the apply pass.
            self.pending = intents;
            trace!(tick, pending = self.pending.len(), "staged decide pass done");
            return commit_all(&self.pending, world, tick);
        }
        commit_all(&intents, world, tick)
    }
}

/// Decide and commit one agent at a time against the live world.
fn interleaved(
    order: &[AgentId],
    world: &mut World,
    params: &RuleParams,
    rng: &mut impl Rng,
    tick: u64,
) -> Activation {
    let mut activation = Activation::default();
    for &id in order {
        let Some(agent) = agent::find(&world.agents, id) else {
            continue;
        };
        let action = rules::decide(agent, &world.grid, &world.agents, params, rng);
        let commit = world.apply(id, &action, tick);
        activation.record(&action, commit);
    }
    activation
}

/// Decide every member against the same, untouched world.
fn decide_all(
    members: &[AgentId],
    world: &World,
    params: &RuleParams,
    rng: &mut impl Rng,
) -> Vec<(AgentId, Action)> {
    members
        .iter()
        .filter_map(|&id| {
            agent::find(&world.agents, id)
                .map(|a| (id, rules::decide(a, &world.grid, &world.agents, params, rng)))
        })
        .collect()
}

/// Commit decided actions in order.
fn commit_all(intents: &[(AgentId, Action)], world: &mut World, tick: u64) -> Activation {
    let mut activation = Activation::default();
    for (id, action) in intents {
        let commit = world.apply(*id, action, tick);
        activation.record(action, commit);
    }
    activation
}
