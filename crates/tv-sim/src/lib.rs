//! `tv-sim` — simulation coordinator and thread lifecycle for rust_travelers.
//!
//! # Lifecycle
//!
//! ```text
//! SimBuilder::build   validate config, lay out exit / walls / partitions,
//!                     place travelers, count them as created
//! Sim::start          spawn one `traveler-<id>` thread per traveler
//!   each thread:      pause(think time) → step → … until it leaves,
//!                     shutdown is requested, or the iteration cap is hit
//! Sim::observe        optional: drive a SimObserver on the calling thread
//! Sim::join           wait for every thread; report failures
//! ```
//!
//! Dropping a started [`Sim`] requests shutdown and joins, so the shared
//! world always outlives every traveler thread.
//!
//! # Crate layout
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`builder`]     | `SimBuilder`                                          |
//! | [`sim`]         | `Sim`, `SimHandle`, traveler thread loop              |
//! | [`coordinator`] | counters, think-time knob, cancellation, pause        |
//! | [`layout`]      | `Layout`, `LayoutBuilder`, random generation          |
//! | [`observer`]    | `SimObserver`, `NoopObserver`, `StatusReport`         |
//! | [`error`]       | `SimError`, `SimResult<T>`                            |

pub mod builder;
pub mod coordinator;
pub mod error;
pub mod layout;
pub mod observer;
pub mod sim;


pub use builder::SimBuilder;
pub use coordinator::{Coordinator, Counters};
pub use error::{SimError, SimResult};
pub use layout::{Layout, LayoutBuilder, Line};
pub use observer::{NoopObserver, SimObserver, StatusReport};
pub use sim::{Sim, SimHandle};
