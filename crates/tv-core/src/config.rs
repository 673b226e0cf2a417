//! Simulation configuration.

use crate::{TvError, TvResult};

// ── ReversalPolicy ────────────────────────────────────────────────────────────

/// Whether a wandering traveler may pick the direction straight back over
/// its own head facing.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ReversalPolicy {
    /// All four directions are equally likely.
    #[default]
    Allow,
    /// The direction opposite the head's facing is never chosen.
    Forbid,
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically built from CLI arguments or loaded from a JSON file by the
/// application crate and passed to `tv_sim::SimBuilder`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Grid height in cells.
    pub rows: u32,

    /// Grid width in cells.
    pub cols: u32,

    /// Number of travelers (and traveler threads) created at startup.
    pub agent_count: u32,

    /// Lower bound applied by `speed_up`, in microseconds.
    pub min_think_micros: u64,

    /// Think time each traveler observes before its first move, in
    /// microseconds.  Adjusted at runtime by `speed_up` / `slow_down`.
    pub initial_think_micros: u64,

    /// Master RNG seed.  Layout and per-traveler direction sequences derive
    /// from it.
    pub seed: u64,

    /// Whether travelers may reverse onto their own facing.
    pub reversal: ReversalPolicy,

    /// Segments each traveler starts with (head included).  Extra segments
    /// are laid behind the head on free cells where possible.
    pub initial_segments: u32,

    /// Every N successful moves a traveler keeps its vacated tail cell and
    /// grows by one segment.  `0` disables growth.
    pub growth_interval: u32,

    /// Per-traveler iteration cap.  `None` runs until the exit is reached or
    /// shutdown is requested.
    pub max_iterations: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rows:                 30,
            cols:                 35,
            agent_count:          12,
            min_think_micros:     1_000,
            initial_think_micros: 100_000,
            seed:                 0,
            reversal:             ReversalPolicy::Allow,
            initial_segments:     1,
            growth_interval:      0,
            max_iterations:       None,
        }
    }
}

impl SimConfig {
    /// Number of cells in the grid.
    #[inline]
    pub fn cell_count(&self) -> u64 {
        self.rows as u64 * self.cols as u64
    }

    /// Check the startup preconditions.
    ///
    /// The grid needs room for the exit plus one cell per traveler; anything
    /// else is rejected before a single thread is spawned.
    pub fn validate(&self) -> TvResult<()> {
        if self.rows < 3 || self.cols < 3 {
            return Err(TvError::Config(format!(
                "grid must be at least 3x3, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.agent_count == 0 {
            return Err(TvError::Config("agent_count must be at least 1".into()));
        }
        if self.agent_count as u64 + 1 > self.cell_count() {
            return Err(TvError::Config(format!(
                "{} travelers plus the exit do not fit in {} cells",
                self.agent_count,
                self.cell_count()
            )));
        }
        if self.initial_think_micros < self.min_think_micros {
            return Err(TvError::Config(format!(
                "initial think time {} us is below the minimum {} us",
                self.initial_think_micros, self.min_think_micros
            )));
        }
        if self.initial_segments == 0 {
            return Err(TvError::Config("initial_segments must be at least 1".into()));
        }
        Ok(())
    }
}
