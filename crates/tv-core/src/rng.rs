//! Deterministic per-traveler and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each traveler gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (agent_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive agent IDs uniformly across the seed space.
//! Travelers never share RNG state, so a traveler's sequence of direction
//! choices depends only on the seed and its id, never on thread scheduling.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{AgentId, Direction};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-traveler deterministic RNG, owned by the traveler's thread.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and an agent ID.
    pub fn new(global_seed: u64, agent: AgentId) -> Self {
        let seed = global_seed ^ (agent.0 as u64).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Uniformly random cardinal direction.
    #[inline]
    pub fn direction(&mut self) -> Direction {
        Direction::ALL[self.0.gen_range(0..Direction::ALL.len())]
    }

    /// Uniformly random direction other than `forbidden`.
    pub fn direction_except(&mut self, forbidden: Direction) -> Direction {
        loop {
            let dir = self.direction();
            if dir != forbidden {
                return dir;
            }
        }
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for layout generation (exit, walls, partitions,
/// initial placement).
///
/// Used only on the building thread before any traveler thread starts.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    #[inline]
    pub fn direction(&mut self) -> Direction {
        Direction::ALL[self.0.gen_range(0..Direction::ALL.len())]
    }
}
