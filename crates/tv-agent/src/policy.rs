//! Movement rules that vary per run but not per traveler.

use tv_core::{AgentRng, Direction, ReversalPolicy, SimConfig};

/// Rules a [`TravelerTask`][crate::TravelerTask] wanders by.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MovePolicy {
    pub reversal:        ReversalPolicy,
    /// Grow by one segment every N successful moves; `0` never grows.
    pub growth_interval: u32,
}

impl MovePolicy {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            reversal:        config.reversal,
            growth_interval: config.growth_interval,
        }
    }

    /// Draw the next heading for a head currently facing `facing`.
    pub fn choose_direction(&self, facing: Direction, rng: &mut AgentRng) -> Direction {
        match self.reversal {
            ReversalPolicy::Allow  => rng.direction(),
            ReversalPolicy::Forbid => rng.direction_except(facing.opposite()),
        }
    }

    /// `true` if the move that brings the count to `moves` should grow the body.
    #[inline]
    pub fn grows_on(&self, moves: u64) -> bool {
        self.growth_interval > 0 && moves % self.growth_interval as u64 == 0
    }
}
