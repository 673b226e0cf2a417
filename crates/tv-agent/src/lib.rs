//! `tv-agent` — travelers and their movement state machine.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                        |
//! |---------------|-----------------------------------------------------------------|
//! | [`traveler`]  | `Segment`, `Traveler` (body behind its own lock), `AgentSnapshot` |
//! | [`task`]      | `TravelerTask` (per-thread state machine), `StepOutcome`      |
//! | [`policy`]    | `MovePolicy`: reversal and growth rules                        |
//! | [`error`]     | `AgentError`, `AgentResult<T>`                                  |
//!
//! # Phases
//!
//! ```text
//! Wandering ──(target is the exit)──▶ Exiting ──(last segment cleared)──▶ Done
//! ```
//!
//! One [`TravelerTask::step`] is one loop iteration.  Pacing (the think-time
//! pause) and bookkeeping on completion belong to the caller, so the state
//! machine can be driven serially in tests or from a dedicated thread.

pub mod error;
pub mod policy;
pub mod task;
pub mod traveler;

#[cfg(test)]
mod tests;

pub use error::{AgentError, AgentResult};
pub use policy::MovePolicy;
pub use task::{BlockReason, Phase, StepOutcome, TravelerTask};
pub use traveler::{AgentSnapshot, Segment, Traveler};
