//! Grid-subsystem error type.

use thiserror::Error;

use tv_core::{PartitionId, Position};

use crate::CellState;

/// Errors produced by `tv-grid`.
///
/// None of these describe a rejected move: a blocked target or a failed
/// slide is an ordinary outcome.  They flag misuse of the lock API or an
/// invalid layout.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("position {pos} is outside the {rows}x{cols} grid")]
    OutOfBounds { pos: Position, rows: u32, cols: u32 },

    #[error("cell {0} is not part of the locked set")]
    NotLocked(Position),

    #[error("cell {pos} is {state:?}, expected Free")]
    NotFree { pos: Position, state: CellState },

    #[error("partition {0} not found")]
    UnknownPartition(PartitionId),

    #[error("invalid partition: {0}")]
    InvalidPartition(String),
}

pub type GridResult<T> = Result<T, GridError>;
