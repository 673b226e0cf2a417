//! `tv-core` — foundational types for the `rust_travelers` simulation.
//!
//! This crate is a dependency of every other `tv-*` crate.  It has no `tv-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `PartitionId`                              |
//! | [`geometry`]    | `Position`, `Direction`, `Orientation`                |
//! | [`rng`]         | `AgentRng` (per-traveler), `SimRng` (layout)          |
//! | [`config`]      | `SimConfig`, `ReversalPolicy`                         |
//! | [`color`]       | `Color`, evenly spaced palette                        |
//! | [`error`]       | `TvError`, `TvResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod rng;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use color::Color;
pub use config::{ReversalPolicy, SimConfig};
pub use error::{TvError, TvResult};
pub use geometry::{Direction, Orientation, Position};
pub use ids::{AgentId, PartitionId};
pub use rng::{AgentRng, SimRng};
