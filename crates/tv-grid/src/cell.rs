//! The state held by a single grid cell.

use tv_core::{AgentId, Orientation, PartitionId};

/// What currently occupies a cell.  Exactly one value per cell at any
/// instant; transitions happen only under that cell's lock.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellState {
    #[default]
    Free,
    Wall,
    Exit,
    /// One segment of the given traveler.
    Traveler(AgentId),
    /// One block of a vertical sliding partition.
    VerticalPartition(PartitionId),
    /// One block of a horizontal sliding partition.
    HorizontalPartition(PartitionId),
}

impl CellState {
    /// Block state for a partition with the given orientation.
    #[inline]
    pub fn partition_block(orientation: Orientation, id: PartitionId) -> Self {
        match orientation {
            Orientation::Vertical   => CellState::VerticalPartition(id),
            Orientation::Horizontal => CellState::HorizontalPartition(id),
        }
    }

    #[inline]
    pub fn is_free(self) -> bool {
        matches!(self, CellState::Free)
    }

    /// The owning partition, if this cell is a partition block.
    #[inline]
    pub fn partition(self) -> Option<PartitionId> {
        match self {
            CellState::VerticalPartition(id) | CellState::HorizontalPartition(id) => Some(id),
            _ => None,
        }
    }

    /// The occupying traveler, if any.
    #[inline]
    pub fn traveler(self) -> Option<AgentId> {
        match self {
            CellState::Traveler(id) => Some(id),
            _ => None,
        }
    }

    /// Single-character glyph for terminal rendering.
    pub fn glyph(self) -> char {
        match self {
            CellState::Free                   => '.',
            CellState::Wall                   => '#',
            CellState::Exit                   => 'X',
            CellState::Traveler(_)            => '@',
            CellState::VerticalPartition(_)   => '|',
            CellState::HorizontalPartition(_) => '=',
        }
    }
}
