//! Toroidal hexagonal lattice with single-occupancy cells.
//!
//! Cells are stored row-major. Hex adjacency uses offset rows: a cell on an
//! even row touches the two cells above and below it on the left side
//! (`x-1` and `x`), a cell on an odd row the two on the right side (`x` and
//! `x+1`), and every cell touches its left and right neighbors. Both axes
//! wrap. With an even height the adjacency relation is symmetric across the
//! vertical seam as well.
//!
//! A radius-`r` neighborhood is the breadth-first expansion of that
//! adjacency out to `r` rings, deduplicated and excluding the center. On a
//! large grid it holds `3 * r * (r + 1)` cells; on small grids wrapped cells
//! are reported once.

use unrest_types::{AgentId, Position};

use crate::error::WorldError;

/// Neighbor offsets `(dx, dy)` for cells on even rows.
const EVEN_ROW_OFFSETS: [(i64, i64); 6] = [(-1, -1), (0, -1), (-1, 0), (1, 0), (-1, 1), (0, 1)];

/// Neighbor offsets `(dx, dy)` for cells on odd rows.
const ODD_ROW_OFFSETS: [(i64, i64); 6] = [(0, -1), (1, -1), (-1, 0), (1, 0), (0, 1), (1, 1)];

/// The simulation lattice.
///
/// Holds occupancy only; agent state lives with the orchestrator. Cloning
/// the grid is how snapshot-isolated schedulers freeze the pre-tick view.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HexGrid {
    /// Number of columns.
    width: u32,
    /// Number of rows.
    height: u32,
    /// Row-major occupancy, `width * height` entries.
    cells: Vec<Option<AgentId>>,
}

impl HexGrid {
    /// Create an empty grid.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EmptyGrid`] if either dimension is zero, or
    /// [`WorldError::TooLarge`] if the cell count does not fit in memory
    /// indices.
    pub fn new(width: u32, height: u32) -> Result<Self, WorldError> {
        if width == 0 || height == 0 {
            return Err(WorldError::EmptyGrid { width, height });
        }
        let len = u64::from(width)
            .checked_mul(u64::from(height))
            .and_then(|n| usize::try_from(n).ok())
            .ok_or(WorldError::TooLarge { width, height })?;
        Ok(Self {
            width,
            height,
            cells: vec![None; len],
        })
    }

    /// Number of columns.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of cells currently holding an agent.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Row-major occupancy, one entry per cell. Read-only view for
    /// renderers.
    pub fn occupancy(&self) -> &[Option<AgentId>] {
        &self.cells
    }

    /// Iterate over every cell position in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Position> + use<> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }

    // -------------------------------------------------------------------
    // Occupancy
    // -------------------------------------------------------------------

    /// Whether the position lies on the grid.
    pub fn contains(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    /// The agent at `pos`, if any.
    pub fn occupant(&self, pos: Position) -> Option<AgentId> {
        self.index(pos)
            .and_then(|i| self.cells.get(i).copied())
            .flatten()
    }

    /// Whether `pos` is on the grid and unoccupied.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.index(pos)
            .and_then(|i| self.cells.get(i))
            .is_some_and(Option::is_none)
    }

    /// Put an agent on an empty cell.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] or [`WorldError::CellOccupied`].
    pub fn place(&mut self, agent: AgentId, pos: Position) -> Result<(), WorldError> {
        let slot = self.slot_mut(pos)?;
        if let Some(occupant) = *slot {
            return Err(WorldError::CellOccupied {
                cell: pos,
                occupant,
            });
        }
        *slot = Some(agent);
        Ok(())
    }

    /// Take an agent off its cell.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] or [`WorldError::AgentNotAtCell`].
    pub fn remove(&mut self, agent: AgentId, pos: Position) -> Result<(), WorldError> {
        let slot = self.slot_mut(pos)?;
        if *slot != Some(agent) {
            return Err(WorldError::AgentNotAtCell { agent, cell: pos });
        }
        *slot = None;
        Ok(())
    }

    /// Relocate an agent, enforcing one agent per cell.
    ///
    /// Nothing is modified unless both checks pass. Moving onto the cell the
    /// agent already occupies is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`], [`WorldError::AgentNotAtCell`],
    /// or [`WorldError::CellOccupied`] as appropriate.
    pub fn move_agent(
        &mut self,
        agent: AgentId,
        from: Position,
        to: Position,
    ) -> Result<(), WorldError> {
        if !self.contains(from) {
            return Err(WorldError::OutOfBounds(from));
        }
        if !self.contains(to) {
            return Err(WorldError::OutOfBounds(to));
        }
        if self.occupant(from) != Some(agent) {
            return Err(WorldError::AgentNotAtCell { agent, cell: from });
        }
        if from == to {
            return Ok(());
        }
        if let Some(occupant) = self.occupant(to) {
            return Err(WorldError::CellOccupied { cell: to, occupant });
        }

        self.remove(agent, from)?;
        self.place(agent, to)
    }

    // -------------------------------------------------------------------
    // Neighborhood queries
    // -------------------------------------------------------------------

    /// The six cells touching `pos`, wrapped toroidally.
    pub fn adjacent(&self, pos: Position) -> [Position; 6] {
        let offsets = if pos.y % 2 == 0 {
            EVEN_ROW_OFFSETS
        } else {
            ODD_ROW_OFFSETS
        };
        offsets.map(|(dx, dy)| {
            Position::new(
                wrap(pos.x, dx, self.width),
                wrap(pos.y, dy, self.height),
            )
        })
    }

    /// All cells within `radius` rings of `center`, excluding the center.
    ///
    /// Order is ring by ring, and within a ring the order adjacency was
    /// discovered in. It is stable between calls on the same grid but
    /// carries no meaning; callers break ties with the run's random source.
    pub fn neighborhood(&self, center: Position, radius: u32) -> Vec<Position> {
        let Some(center_index) = self.index(center) else {
            return Vec::new();
        };

        let mut visited = vec![false; self.cells.len()];
        if let Some(seen) = visited.get_mut(center_index) {
            *seen = true;
        }

        let mut result = Vec::new();
        let mut frontier = vec![center];
        for _ in 0..radius {
            let mut next = Vec::new();
            for cell in &frontier {
                for candidate in self.adjacent(*cell) {
                    if let Some(i) = self.index(candidate)
                        && let Some(seen) = visited.get_mut(i)
                        && !*seen
                    {
                        *seen = true;
                        result.push(candidate);
                        next.push(candidate);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        result
    }

    /// Cells within `radius` rings with their occupants.
    pub fn neighbors(&self, center: Position, radius: u32) -> Vec<(Position, Option<AgentId>)> {
        self.neighborhood(center, radius)
            .into_iter()
            .map(|cell| (cell, self.occupant(cell)))
            .collect()
    }

    /// Occupied cells within `radius` rings.
    pub fn occupants(&self, center: Position, radius: u32) -> Vec<(Position, AgentId)> {
        self.neighborhood(center, radius)
            .into_iter()
            .filter_map(|cell| self.occupant(cell).map(|agent| (cell, agent)))
            .collect()
    }

    /// Unoccupied cells within `radius` rings.
    pub fn empty_cells(&self, center: Position, radius: u32) -> Vec<Position> {
        self.neighborhood(center, radius)
            .into_iter()
            .filter(|cell| self.is_empty(*cell))
            .collect()
    }

    /// Every unoccupied cell on the grid, row-major.
    pub fn all_empty_cells(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .filter_map(|(i, _)| self.position_of(i))
            .collect()
    }

    // -------------------------------------------------------------------
    // Indexing
    // -------------------------------------------------------------------

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        let row = usize::try_from(pos.y).ok()?;
        let col = usize::try_from(pos.x).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(col)
    }

    fn position_of(&self, index: usize) -> Option<Position> {
        let width = usize::try_from(self.width).ok()?;
        let x = u32::try_from(index.checked_rem(width)?).ok()?;
        let y = u32::try_from(index.checked_div(width)?).ok()?;
        Some(Position::new(x, y))
    }

    fn slot_mut(&mut self, pos: Position) -> Result<&mut Option<AgentId>, WorldError> {
        let i = self.index(pos).ok_or(WorldError::OutOfBounds(pos))?;
        self.cells.get_mut(i).ok_or(WorldError::OutOfBounds(pos))
    }
}

/// Shift a coordinate by `delta` and wrap it into `0..size`.
fn wrap(value: u32, delta: i64, size: u32) -> u32 {
    let shifted = i64::from(value)
        .saturating_add(delta)
        .rem_euclid(i64::from(size.max(1)));
    u32::try_from(shifted).unwrap_or(0)
}
