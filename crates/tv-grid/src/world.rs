//! The shared world every traveler thread operates on.

use tv_core::{Direction, PartitionId, Position};

use crate::{CellState, Grid, GridError, GridResult, PartitionRegistry};

/// Grid plus partitions, built once and then shared behind an `Arc`.
///
/// Mutation after construction goes exclusively through cell and partition
/// locks, so `&World` is all a traveler thread ever needs.
pub struct World {
    pub grid:       Grid,
    pub partitions: PartitionRegistry,
    exit:           Option<Position>,
}

impl World {
    /// An empty world: all cells `Free`, no partitions, no exit.
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            grid:       Grid::new(rows, cols),
            partitions: PartitionRegistry::new(),
            exit:       None,
        }
    }

    /// Place the exit.  A world has at most one; placing again moves it.
    pub fn place_exit(&mut self, pos: Position) -> GridResult<()> {
        if let Some(old) = self.exit.take() {
            self.grid.lock_cell(old)?.set(CellState::Free);
        }
        let mut cell = self.grid.lock_cell(pos)?;
        let state = cell.state();
        if !state.is_free() {
            return Err(GridError::NotFree { pos, state });
        }
        cell.set(CellState::Exit);
        self.exit = Some(pos);
        Ok(())
    }

    /// Turn a free cell into a wall.
    pub fn place_wall(&self, pos: Position) -> GridResult<()> {
        let mut cell = self.grid.lock_cell(pos)?;
        let state = cell.state();
        if !state.is_free() {
            return Err(GridError::NotFree { pos, state });
        }
        cell.set(CellState::Wall);
        Ok(())
    }

    #[inline]
    pub fn exit(&self) -> Option<Position> {
        self.exit
    }

    /// Push partition `id` one cell in `dir`; see
    /// [`PartitionRegistry::slide`].
    #[inline]
    pub fn slide(&self, id: PartitionId, dir: Direction) -> GridResult<bool> {
        self.partitions.slide(&self.grid, id, dir)
    }
}
