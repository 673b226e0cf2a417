//! The cell grid: one mutex per cell, state stored inside the mutex.
//!
//! # Design
//!
//! Cells live in a row-major `Box<[Mutex<CellState>]>` allocated once and
//! never resized, so a `Position` maps to its lock in O(1) via
//! [`Position::linear`].  Every index is bounds-checked before a lock is
//! taken.
//!
//! Single-cell access returns a [`CellGuard`]; multi-cell access returns a
//! [`CellSetGuard`] whose locks were all acquired, in row-major order, before
//! the caller sees any of them.  Guards release on drop.

use parking_lot::{Mutex, MutexGuard};

use tv_core::{AgentId, Position};

use crate::{CellState, GridError, GridResult, GridSnapshot};

/// Fixed-size `rows × cols` grid of lock-protected cells.
pub struct Grid {
    rows:  u32,
    cols:  u32,
    cells: Box<[Mutex<CellState>]>,
}

impl Grid {
    /// Allocate a grid with every cell `Free`.
    pub fn new(rows: u32, cols: u32) -> Self {
        let cells = (0..rows as usize * cols as usize)
            .map(|_| Mutex::new(CellState::Free))
            .collect();
        Self { rows, cols, cells }
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// `true` if `pos` addresses a cell of this grid.
    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    fn slot(&self, pos: Position) -> GridResult<&Mutex<CellState>> {
        if !self.contains(pos) {
            return Err(GridError::OutOfBounds { pos, rows: self.rows, cols: self.cols });
        }
        Ok(&self.cells[pos.linear(self.cols)])
    }

    /// Acquire exclusive access to one cell.
    pub fn lock_cell(&self, pos: Position) -> GridResult<CellGuard<'_>> {
        Ok(CellGuard { guard: self.slot(pos)?.lock() })
    }

    /// Acquire exclusive access to every cell in `positions` as one step.
    ///
    /// Duplicates are collapsed and the locks are taken in row-major order.
    /// All positions are bounds-checked before the first lock is taken, so
    /// an error never leaves a partial set held.
    pub fn lock_cells<I>(&self, positions: I) -> GridResult<CellSetGuard<'_>>
    where
        I: IntoIterator<Item = Position>,
    {
        let mut order: Vec<Position> = positions.into_iter().collect();
        order.sort_unstable();
        order.dedup();

        let slots = order
            .iter()
            .map(|&pos| self.slot(pos))
            .collect::<GridResult<Vec<_>>>()?;

        let entries = order
            .into_iter()
            .zip(slots)
            .map(|(pos, slot)| (pos, slot.lock()))
            .collect();
        Ok(CellSetGuard { entries })
    }

    /// Copy the whole grid, holding one cell lock at a time.
    ///
    /// The copy is consistent per cell, not across cells: a traveler moving
    /// during the copy may appear in both or neither of its two cells.
    pub fn snapshot(&self) -> GridSnapshot {
        let cells = self.cells.iter().map(|c| *c.lock()).collect();
        GridSnapshot::new(self.rows, self.cols, cells)
    }

    /// Count cells matching `pred`, one lock at a time.
    pub fn count_where(&self, pred: impl Fn(CellState) -> bool) -> usize {
        self.cells.iter().filter(|c| pred(*c.lock())).count()
    }

    /// Every free cell, in row-major order.  Used during layout, before any
    /// traveler thread exists.
    pub fn free_cells(&self) -> Vec<Position> {
        (0..self.rows)
            .flat_map(|row| (0..self.cols).map(move |col| Position::new(row, col)))
            .filter(|&pos| self.cells[pos.linear(self.cols)].lock().is_free())
            .collect()
    }
}

// ── CellGuard ─────────────────────────────────────────────────────────────────

/// Exclusive access to a single cell.  The lock is released on drop.
pub struct CellGuard<'a> {
    guard: MutexGuard<'a, CellState>,
}

impl CellGuard<'_> {
    #[inline]
    pub fn state(&self) -> CellState {
        *self.guard
    }

    #[inline]
    pub fn set(&mut self, state: CellState) {
        *self.guard = state;
    }

    /// Occupy the cell for `agent` if it is `Free`.
    ///
    /// Returns the state found before the attempt; the cell was taken iff
    /// that state is `Free`.
    pub fn try_occupy(&mut self, agent: AgentId) -> CellState {
        let prior = *self.guard;
        if prior.is_free() {
            *self.guard = CellState::Traveler(agent);
        }
        prior
    }
}

// ── CellSetGuard ──────────────────────────────────────────────────────────────

/// Exclusive access to a set of cells, all held simultaneously.
///
/// Entries are kept sorted by position so lookups are binary searches.
/// Dropping the guard releases every lock.
pub struct CellSetGuard<'a> {
    entries: Vec<(Position, MutexGuard<'a, CellState>)>,
}

impl CellSetGuard<'_> {
    fn find(&self, pos: Position) -> GridResult<usize> {
        self.entries
            .binary_search_by_key(&pos, |(p, _)| *p)
            .map_err(|_| GridError::NotLocked(pos))
    }

    /// State of a locked cell.
    pub fn state(&self, pos: Position) -> GridResult<CellState> {
        let i = self.find(pos)?;
        Ok(*self.entries[i].1)
    }

    /// Overwrite a locked cell.
    pub fn set(&mut self, pos: Position, state: CellState) -> GridResult<()> {
        let i = self.find(pos)?;
        *self.entries[i].1 = state;
        Ok(())
    }

    /// Locked positions in acquisition (row-major) order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.entries.iter().map(|(p, _)| *p)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
