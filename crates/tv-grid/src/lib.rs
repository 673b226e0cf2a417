//! `tv-grid` — the shared cell grid and its sliding partitions.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`cell`]        | `CellState`, the one value every cell holds               |
//! | [`grid`]        | `Grid` (one lock per cell), `CellGuard`, `CellSetGuard`   |
//! | [`partition`]   | `Partition`, `PartitionRegistry`, transactional slide     |
//! | [`snapshot`]    | `GridSnapshot`, lock-scoped copy for observers            |
//! | [`world`]       | `World`: grid + partitions shared by all travelers        |
//! | [`error`]       | `GridError`, `GridResult<T>`                              |
//!
//! # Locking discipline
//!
//! Every cell's state lives *inside* that cell's mutex, so reading or writing
//! a cell without holding its lock does not compile.  Operations touching
//! several cells go through [`Grid::lock_cells`], which acquires the whole
//! set in row-major order.  Because every caller uses that single total
//! order, two threads needing overlapping sets can never wait on each other
//! in a cycle.
//!
//! A partition's own lock is always taken *before* any cell lock; nothing
//! takes a partition lock while holding a cell lock.

pub mod cell;
pub mod error;
pub mod grid;
pub mod partition;
pub mod snapshot;
pub mod world;

#[cfg(test)]
mod tests;

pub use cell::CellState;
pub use error::{GridError, GridResult};
pub use grid::{CellGuard, CellSetGuard, Grid};
pub use partition::{Partition, PartitionRegistry};
pub use snapshot::GridSnapshot;
pub use world::World;
