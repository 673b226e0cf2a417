//! Observer interface: periodic read-only access for display and reporting.

use std::ops::ControlFlow;

use crate::SimHandle;

/// Run summary suitable for a status line.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusReport {
    pub created:      u32,
    pub finished:     u32,
    /// Traveler threads running at the moment of the report.
    pub live:         u32,
    /// Think time at the moment of the report, in microseconds.
    pub think_micros: u64,
    /// Seconds since [`Sim::start`][crate::Sim::start]; `0.0` before it.
    pub elapsed_secs: f64,
}

/// Callbacks invoked by [`Sim::observe`][crate::Sim::observe].
///
/// All methods have default implementations so implementors only need to
/// override what they care about.  The handle is read-only apart from the
/// speed knob and shutdown request, and every snapshot taken through it
/// holds one lock at a time.
///
/// # Example — status printer
///
/// ```rust,ignore
/// struct StatusPrinter;
///
/// impl SimObserver for StatusPrinter {
///     fn on_frame(&mut self, sim: &SimHandle) -> ControlFlow<()> {
///         let s = sim.status();
///         println!("{:.1}s: {} of {} out", s.elapsed_secs, s.finished, s.created);
///         ControlFlow::Continue(())
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called once before the first frame.
    fn on_start(&mut self, _sim: &SimHandle) {}

    /// Called every observation interval.  Return `Break` to stop observing
    /// (the travelers keep running).
    fn on_frame(&mut self, _sim: &SimHandle) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Called once after the last frame.
    fn on_end(&mut self, _sim: &SimHandle) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
