//! Run-wide shared state: counters, the think-time knob, and cancellation.
//!
//! Every lock in this module is a leaf: none is ever held while a cell,
//! partition, or traveler lock is taken, and none is held across a call
//! into another module.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::debug;

// ── Counters ──────────────────────────────────────────────────────────────────

/// Traveler bookkeeping, read and written as one unit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Counters {
    /// Travelers placed on the grid.
    pub created:  u32,
    /// Travelers that left through the exit.
    pub finished: u32,
    /// Traveler threads currently running.  Always zero for a simulation
    /// driven by [`Sim::step_all`][crate::Sim::step_all].
    pub live:     u32,
}

// ── Coordinator ───────────────────────────────────────────────────────────────

/// Counters, think time and the shutdown flag shared by every traveler
/// thread and observer of one simulation.
pub struct Coordinator {
    counters:   Mutex<Counters>,
    think:      AtomicU64,
    min_think:  u64,
    /// Fast-path mirror of `shutdown`, readable without the lock.
    cancelled:  AtomicBool,
    shutdown:   Mutex<bool>,
    wake:       Condvar,
}

impl Coordinator {
    pub fn new(initial_think_micros: u64, min_think_micros: u64) -> Self {
        Self {
            counters:  Mutex::new(Counters::default()),
            think:     AtomicU64::new(initial_think_micros),
            min_think: min_think_micros,
            cancelled: AtomicBool::new(false),
            shutdown:  Mutex::new(false),
            wake:      Condvar::new(),
        }
    }

    // ── Counters ──────────────────────────────────────────────────────────

    pub fn agent_created(&self) {
        self.counters.lock().created += 1;
    }

    /// Record one traveler leaving through the exit.
    pub fn agent_finished(&self) {
        self.counters.lock().finished += 1;
    }

    /// A traveler thread is about to run.
    pub fn thread_started(&self) {
        self.counters.lock().live += 1;
    }

    /// A traveler thread has returned, or was never spawned after
    /// [`thread_started`](Self::thread_started).
    pub fn thread_exited(&self) {
        let mut c = self.counters.lock();
        c.live = c.live.saturating_sub(1);
    }

    #[inline]
    pub fn counters(&self) -> Counters {
        *self.counters.lock()
    }

    pub fn live_count(&self) -> u32 {
        self.counters.lock().live
    }

    pub fn created_count(&self) -> u32 {
        self.counters.lock().created
    }

    pub fn finished_count(&self) -> u32 {
        self.counters.lock().finished
    }

    // ── Think time ────────────────────────────────────────────────────────

    /// Current pause between iterations, in microseconds.
    #[inline]
    pub fn think_time(&self) -> u64 {
        self.think.load(Ordering::Relaxed)
    }

    pub fn set_think_time(&self, micros: u64) {
        self.think.store(micros, Ordering::Relaxed);
    }

    /// Shorten the pause to 80 %, never below the configured minimum.
    /// Returns the new value.
    pub fn speed_up(&self) -> u64 {
        self.update_think(|t| ((t as u128 * 8 / 10) as u64).max(self.min_think))
    }

    /// Lengthen the pause to 120 %, by at least one microsecond.  Returns the
    /// new value.
    pub fn slow_down(&self) -> u64 {
        self.update_think(|t| {
            let scaled = t.saturating_mul(12) / 10;
            scaled.max(t.saturating_add(1))
        })
    }

    fn update_think(&self, f: impl Fn(u64) -> u64) -> u64 {
        let prev = self
            .think
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |t| Some(f(t)))
            .unwrap_or_else(|t| t);
        let next = f(prev);
        debug!(think_micros = next, "think time changed");
        next
    }

    // ── Cancellation ──────────────────────────────────────────────────────

    /// Ask every traveler thread to stop after its current iteration and
    /// wake the ones that are pausing.
    pub fn request_shutdown(&self) {
        let mut flag = self.shutdown.lock();
        *flag = true;
        self.cancelled.store(true, Ordering::Release);
        self.wake.notify_all();
    }

    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Sleep for the current think time.
    ///
    /// Returns `false` if shutdown was requested before or during the pause;
    /// the caller should then end its loop.
    pub fn pause(&self) -> bool {
        let micros = self.think_time();
        if micros == 0 {
            return !self.is_shutdown();
        }
        let deadline = Instant::now() + Duration::from_micros(micros);
        let mut flag = self.shutdown.lock();
        while !*flag {
            if self.wake.wait_until(&mut flag, deadline).timed_out() {
                break;
            }
        }
        !*flag
    }
}
