//! Sliding partitions: movable, multi-cell, axis-aligned obstacles.
//!
//! # Slide protocol
//!
//! 1. Take the partition's own lock so its stored block list cannot change.
//! 2. Compute every destination; any destination off the grid fails at once.
//! 3. Lock current blocks ∪ destinations as one row-major set.
//! 4. Every destination must be `Free`; otherwise release and report `false`.
//! 5. Clear the current blocks, write the destinations, store the new list.
//!
//! Destination cells are locked along with the current blocks, so no
//! traveler or competing slide can claim a destination between the check in
//! step 4 and the write in step 5.

use parking_lot::Mutex;
use tracing::{debug, trace};

use tv_core::{Direction, Orientation, PartitionId, Position};

use crate::{CellState, Grid, GridError, GridResult};

/// A line of contiguous partition blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Partition {
    pub id:          PartitionId,
    pub orientation: Orientation,
    /// Block positions, first block at index 0, laid out along
    /// `orientation.extent()`.
    pub blocks:      Vec<Position>,
}

impl Partition {
    /// Cell state every block of this partition holds.
    #[inline]
    pub fn block_state(&self) -> CellState {
        CellState::partition_block(self.orientation, self.id)
    }
}

/// All partitions of a run, each behind its own lock.
///
/// Partitions are registered during layout (exclusive `&mut` access) and
/// then only slid, never added or removed, while travelers run.
#[derive(Default)]
pub struct PartitionRegistry {
    partitions: Vec<Mutex<Partition>>,
}

impl PartitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Lay a new partition on `grid` starting at `start` and extending
    /// `length` cells along `orientation`.
    ///
    /// Every covered cell must be in bounds and `Free`; nothing is written
    /// unless all of them are.
    pub fn register(
        &mut self,
        grid:        &Grid,
        orientation: Orientation,
        start:       Position,
        length:      u32,
    ) -> GridResult<PartitionId> {
        if length == 0 {
            return Err(GridError::InvalidPartition("length must be at least 1".into()));
        }
        let id = PartitionId::try_from(self.partitions.len())
            .map_err(|_| GridError::InvalidPartition("too many partitions".into()))?;

        let mut blocks = Vec::with_capacity(length as usize);
        let mut pos = start;
        for i in 0..length {
            if i > 0 {
                pos = pos
                    .step(orientation.extent(), grid.rows(), grid.cols())
                    .ok_or(GridError::OutOfBounds { pos, rows: grid.rows(), cols: grid.cols() })?;
            }
            blocks.push(pos);
        }

        let mut cells = grid.lock_cells(blocks.iter().copied())?;
        for &pos in &blocks {
            let state = cells.state(pos)?;
            if !state.is_free() {
                return Err(GridError::NotFree { pos, state });
            }
        }
        let block = CellState::partition_block(orientation, id);
        for &pos in &blocks {
            cells.set(pos, block)?;
        }
        drop(cells);

        self.partitions.push(Mutex::new(Partition { id, orientation, blocks }));
        Ok(id)
    }

    /// Copy of a partition's current state.
    pub fn get(&self, id: PartitionId) -> Option<Partition> {
        self.partitions.get(id.index()).map(|p| p.lock().clone())
    }

    /// Copies of every partition, one lock at a time.
    pub fn snapshot(&self) -> Vec<Partition> {
        self.partitions.iter().map(|p| p.lock().clone()).collect()
    }

    /// Try to push partition `id` one cell in `dir`.
    ///
    /// Returns `Ok(false)` when the move is blocked (a destination is off the
    /// grid or not `Free`); the grid is then untouched.  Errors only for an
    /// unknown id.
    pub fn slide(&self, grid: &Grid, id: PartitionId, dir: Direction) -> GridResult<bool> {
        let slot = self.partitions.get(id.index()).ok_or(GridError::UnknownPartition(id))?;
        let mut part = slot.lock();

        let Some(dest) = part
            .blocks
            .iter()
            .map(|p| p.step(dir, grid.rows(), grid.cols()))
            .collect::<Option<Vec<Position>>>()
        else {
            trace!(partition = %id, %dir, "slide blocked by grid edge");
            return Ok(false);
        };

        let mut cells = grid.lock_cells(part.blocks.iter().chain(dest.iter()).copied())?;

        for &pos in &dest {
            if !cells.state(pos)?.is_free() {
                trace!(partition = %id, %dir, blocked_at = %pos, "slide blocked");
                return Ok(false);
            }
        }

        for &pos in &part.blocks {
            cells.set(pos, CellState::Free)?;
        }
        let block = part.block_state();
        for &pos in &dest {
            cells.set(pos, block)?;
        }
        part.blocks = dest;

        debug!(partition = %id, %dir, "partition slid");
        Ok(true)
    }

    /// `true` if every partition's stored blocks hold its block state and no
    /// other cell claims to belong to it.  Takes each partition lock in turn
    /// and snapshots the grid; call only while the grid is quiescent.
    pub fn is_consistent_with(&self, grid: &Grid) -> bool {
        let snap = grid.snapshot();
        self.partitions.iter().all(|slot| {
            let part = slot.lock();
            let block = part.block_state();
            part.blocks.iter().all(|&p| snap.get(p) == Some(block))
                && snap.count(|c| c == block) == part.blocks.len()
        })
    }
}
