//! Imprisonment, sentence countdown, and release placement.
//!
//! An arrested citizen leaves the lattice but keeps its last position. Each
//! tick the orchestrator runs [`serve`] on every citizen; a citizen arrested
//! during that same tick is skipped, so a sentence of `s` ticks shows up as
//! Jailed in exactly `s` end-of-tick summaries. On release the orchestrator
//! asks [`release_cell`] where to put the citizen back.

use rand::Rng;
use rand::seq::IndexedRandom;

use unrest_types::{Condition, Position};
use unrest_world::HexGrid;

use crate::agent::Citizen;

/// Outcome of one countdown step for a citizen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JailTick {
    /// The citizen is free; nothing happened.
    Free,
    /// The citizen remains in jail.
    Serving,
    /// The sentence ran out this tick; the citizen is Quiescent again and
    /// must be put back on the grid.
    Released,
}

/// Jail a citizen for `sentence` ticks during iteration `tick`.
///
/// A zero sentence is raised to one so the arrest is never a no-op.
pub fn imprison(citizen: &mut Citizen, sentence: u32, tick: u64) {
    citizen.condition = Condition::Jailed;
    citizen.jail_sentence = sentence.max(1);
    citizen.jailed_at = Some(tick);
}

/// Advance a citizen's sentence by one tick.
pub fn serve(citizen: &mut Citizen, tick: u64) -> JailTick {
    if !citizen.is_jailed() {
        return JailTick::Free;
    }
    if citizen.jailed_at == Some(tick) {
        return JailTick::Serving;
    }

    citizen.jail_sentence = citizen.jail_sentence.saturating_sub(1);
    if citizen.jail_sentence > 0 {
        return JailTick::Serving;
    }

    citizen.condition = Condition::Quiescent;
    citizen.jailed_at = None;
    JailTick::Released
}

/// Put a released citizen back in jail for one more tick because no cell
/// was free for it.
pub const fn hold_over(citizen: &mut Citizen) {
    citizen.condition = Condition::Jailed;
    citizen.jail_sentence = 1;
}

/// Choose where a released citizen re-enters the grid.
///
/// Prefers the recorded cell, then a random empty cell within vision of it,
/// then a random empty cell anywhere. `None` only when the grid is full.
pub fn release_cell(grid: &HexGrid, citizen: &Citizen, rng: &mut impl Rng) -> Option<Position> {
    if grid.is_empty(citizen.position) {
        return Some(citizen.position);
    }
    if let Some(cell) = grid
        .empty_cells(citizen.position, citizen.vision)
        .choose(rng)
    {
        return Some(*cell);
    }
    grid.all_empty_cells().choose(rng).copied()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use unrest_types::AgentId;

    use super::*;
    use crate::agent::CitizenTraits;

    fn citizen(pos: Position, vision: u32) -> Citizen {
        Citizen::new(
            AgentId::new(0),
            pos,
            vision,
            CitizenTraits {
                hardship: 0.5,
                regime_legitimacy: 0.5,
                risk_aversion: 0.5,
            },
            0.1,
        )
    }

    #[test]
    fn sentence_counts_down_to_release() {
        let mut c = citizen(Position::new(0, 0), 1);
        imprison(&mut c, 3, 5);
        assert_eq!(serve(&mut c, 5), JailTick::Serving);
        assert_eq!(c.jail_sentence, 3);

        assert_eq!(serve(&mut c, 6), JailTick::Serving);
        assert_eq!(c.jail_sentence, 2);
        assert_eq!(serve(&mut c, 7), JailTick::Serving);
        assert_eq!(c.jail_sentence, 1);
        assert_eq!(serve(&mut c, 8), JailTick::Released);
        assert_eq!(c.jail_sentence, 0);
        assert_eq!(c.condition, Condition::Quiescent);
        assert_eq!(serve(&mut c, 9), JailTick::Free);
    }

    #[test]
    fn zero_sentence_is_raised_to_one() {
        let mut c = citizen(Position::new(0, 0), 1);
        imprison(&mut c, 0, 0);
        assert_eq!(c.jail_sentence, 1);
        assert_eq!(serve(&mut c, 1), JailTick::Released);
    }

    #[test]
    fn release_prefers_recorded_cell() {
        let grid = HexGrid::new(5, 5).unwrap();
        let c = citizen(Position::new(2, 2), 1);
        let mut rng = SmallRng::seed_from_u64(42);
        assert_eq!(release_cell(&grid, &c, &mut rng), Some(Position::new(2, 2)));
    }

    #[test]
    fn release_falls_back_to_vision_then_anywhere() {
        let mut grid = HexGrid::new(5, 5).unwrap();
        let home = Position::new(2, 2);
        grid.place(AgentId::new(1), home).unwrap();
        let c = citizen(home, 1);
        let mut rng = SmallRng::seed_from_u64(42);

        let cell = release_cell(&grid, &c, &mut rng).unwrap();
        assert!(grid.neighborhood(home, 1).contains(&cell));

        for (i, neighbor) in grid.neighborhood(home, 1).into_iter().enumerate() {
            let id = u64::try_from(i).unwrap().saturating_add(10);
            grid.place(AgentId::new(id), neighbor).unwrap();
        }
        let cell = release_cell(&grid, &c, &mut rng).unwrap();
        assert!(grid.is_empty(cell));
        assert!(!grid.neighborhood(home, 1).contains(&cell));
    }

    #[test]
    fn release_on_full_grid_is_none() {
        let mut grid = HexGrid::new(1, 1).unwrap();
        grid.place(AgentId::new(1), Position::new(0, 0)).unwrap();
        let c = citizen(Position::new(0, 0), 1);
        let mut rng = SmallRng::seed_from_u64(42);
        assert_eq!(release_cell(&grid, &c, &mut rng), None);
    }
}
