//! Owned copy of the grid for observers.

use tv_core::Position;

use crate::CellState;

/// A row-major copy of every cell state, detached from the live grid.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridSnapshot {
    rows:  u32,
    cols:  u32,
    cells: Vec<CellState>,
}

impl GridSnapshot {
    pub(crate) fn new(rows: u32, cols: u32, cells: Vec<CellState>) -> Self {
        debug_assert_eq!(cells.len(), rows as usize * cols as usize);
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

    /// State at `pos`, or `None` when out of bounds.
    pub fn get(&self, pos: Position) -> Option<CellState> {
        (pos.row < self.rows && pos.col < self.cols).then(|| self.cells[pos.linear(self.cols)])
    }

    /// One row of cells, west to east, or `None` when out of bounds.
    pub fn row(&self, row: u32) -> Option<&[CellState]> {
        let cols = self.cols as usize;
        (row < self.rows).then(|| &self.cells[row as usize * cols..(row as usize + 1) * cols])
    }

    pub fn count(&self, pred: impl Fn(CellState) -> bool) -> usize {
        self.cells.iter().filter(|&&c| pred(c)).count()
    }
}
