//! The `Sim` runner, its shareable [`SimHandle`], and the traveler thread
//! loop.

use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{error, info, warn};

use tv_agent::{AgentResult, AgentSnapshot, Phase, StepOutcome, Traveler, TravelerTask};
use tv_core::AgentId;
use tv_grid::{GridSnapshot, Partition, World};

use crate::{Coordinator, Counters, SimError, SimObserver, SimResult, StatusReport};

// ── Shared state ──────────────────────────────────────────────────────────────

/// Everything traveler threads and observers share.  Lives behind one `Arc`
/// and is dropped only after every traveler thread has been joined.
pub(crate) struct Shared {
    pub(crate) world:       World,
    pub(crate) travelers:   Vec<Arc<Traveler>>,
    pub(crate) coordinator: Coordinator,
    pub(crate) started_at:  OnceLock<Instant>,
}

// ── SimHandle ─────────────────────────────────────────────────────────────────

/// Cheap, cloneable, read-mostly view of a running simulation.
///
/// Safe to use from any thread, including while [`Sim::join`] blocks on
/// another.  Every method takes at most one lock at a time.
#[derive(Clone)]
pub struct SimHandle {
    shared: Arc<Shared>,
}

impl SimHandle {
    /// Copy of the grid, one cell lock at a time.
    pub fn snapshot_grid(&self) -> GridSnapshot {
        self.shared.world.grid.snapshot()
    }

    /// Copy of one traveler's body and color.  The segment list is empty
    /// once the traveler has left.
    pub fn snapshot_agent(&self, id: AgentId) -> Option<AgentSnapshot> {
        self.shared.travelers.get(id.index()).map(|t| t.snapshot())
    }

    /// Copies of every traveler, in id order.
    pub fn snapshot_agents(&self) -> Vec<AgentSnapshot> {
        self.shared.travelers.iter().map(|t| t.snapshot()).collect()
    }

    pub fn partitions(&self) -> Vec<Partition> {
        self.shared.world.partitions.snapshot()
    }

    #[inline]
    pub fn agent_count(&self) -> usize {
        self.shared.travelers.len()
    }

    pub fn counters(&self) -> Counters {
        self.shared.coordinator.counters()
    }

    pub fn status(&self) -> StatusReport {
        let c = self.shared.coordinator.counters();
        StatusReport {
            created:      c.created,
            finished:     c.finished,
            live:         c.live,
            think_micros: self.shared.coordinator.think_time(),
            elapsed_secs: self
                .shared
                .started_at
                .get()
                .map_or(0.0, |t| t.elapsed().as_secs_f64()),
        }
    }

    #[inline]
    pub fn think_time(&self) -> u64 {
        self.shared.coordinator.think_time()
    }

    pub fn speed_up(&self) -> u64 {
        self.shared.coordinator.speed_up()
    }

    pub fn slow_down(&self) -> u64 {
        self.shared.coordinator.slow_down()
    }

    pub fn set_think_time(&self, micros: u64) {
        self.shared.coordinator.set_think_time(micros);
    }

    /// Ask every traveler thread to stop.  Does not wait; see
    /// [`Sim::shutdown`].
    pub fn request_shutdown(&self) {
        self.shared.coordinator.request_shutdown();
    }

    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.shared.coordinator.is_shutdown()
    }
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// A built simulation.
///
/// Created idle by [`SimBuilder`][crate::SimBuilder].  From there either
/// [`start`](Self::start) one thread per traveler, or drive every traveler
/// on the calling thread with [`step_all`](Self::step_all).
///
/// Dropping a started `Sim` requests shutdown and joins every thread, so the
/// grid is never released while a traveler can still touch it.
pub struct Sim {
    handle:         SimHandle,
    /// Tasks not yet handed to a thread.
    pending:        Vec<TravelerTask>,
    threads:        Vec<(AgentId, JoinHandle<AgentResult<()>>)>,
    max_iterations: Option<u64>,
    stack_size:     Option<usize>,
}

impl Sim {
    pub(crate) fn new(
        shared:         Shared,
        tasks:          Vec<TravelerTask>,
        max_iterations: Option<u64>,
        stack_size:     Option<usize>,
    ) -> Self {
        Self {
            handle: SimHandle { shared: Arc::new(shared) },
            pending: tasks,
            threads: Vec::new(),
            max_iterations,
            stack_size,
        }
    }

    /// A cloneable handle for observers and controllers on other threads.
    pub fn handle(&self) -> SimHandle {
        self.handle.clone()
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.handle.shared.world
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.handle.shared.started_at.get().is_some()
    }

    // ── Running ───────────────────────────────────────────────────────────

    /// Spawn one named thread per traveler.
    ///
    /// If a spawn fails, the travelers without a thread stay pending and a
    /// later call retries them.  Calling it again with nothing pending is
    /// [`SimError::AlreadyStarted`].
    pub fn start(&mut self) -> SimResult<()> {
        if self.is_started() && self.pending.is_empty() {
            return Err(SimError::AlreadyStarted);
        }
        self.handle.shared.started_at.get_or_init(Instant::now);
        info!(
            travelers = self.pending.len(),
            think_micros = self.handle.think_time(),
            "starting traveler threads"
        );

        let mut pending = std::mem::take(&mut self.pending).into_iter();
        while let Some(task) = pending.next() {
            let id = task.id();
            // Handed over only once the thread exists, so a failed spawn
            // gives the task back.
            let slot = Arc::new(Mutex::new(Some(task)));
            let live = LiveThread::new(Arc::clone(&self.handle.shared));
            let cap = self.max_iterations;

            let mut builder = thread::Builder::new().name(format!("traveler-{}", id.0));
            if let Some(bytes) = self.stack_size {
                builder = builder.stack_size(bytes);
            }
            let spawned = builder.spawn({
                let slot = Arc::clone(&slot);
                move || {
                    let live = live;
                    let task = slot.lock().take();
                    match task {
                        Some(task) => run_traveler(&live.0, task, cap),
                        None => Ok(()),
                    }
                }
            });

            match spawned {
                Ok(handle) => self.threads.push((id, handle)),
                Err(err) => {
                    warn!(agent = %id, error = %err, "could not spawn traveler thread");
                    self.pending.extend(slot.lock().take());
                    self.pending.extend(pending);
                    return Err(SimError::Spawn(err));
                }
            }
        }
        Ok(())
    }

    /// One iteration of every unfinished traveler, in id order, on the
    /// calling thread, without pausing.  Only valid before
    /// [`start`](Self::start).  Returns how many travelers are still on the
    /// grid.
    pub fn step_all(&mut self) -> SimResult<usize> {
        if self.is_started() {
            return Err(SimError::AlreadyStarted);
        }
        let world = &self.handle.shared.world;
        let coordinator = &self.handle.shared.coordinator;
        let mut active = 0;
        for task in self.pending.iter_mut().filter(|t| t.phase() != Phase::Done) {
            let outcome = task
                .step(world)
                .map_err(|source| SimError::Agent { agent: task.id(), source })?;
            if let StepOutcome::Finished(_) = outcome {
                coordinator.agent_finished();
            } else {
                active += 1;
            }
        }
        Ok(active)
    }

    /// `true` once every started traveler thread has returned.
    pub fn is_finished(&self) -> bool {
        self.threads.iter().all(|(_, h)| h.is_finished())
    }

    /// Drive `observer` every `interval` until all traveler threads have
    /// returned, shutdown is requested, or the observer breaks.
    pub fn observe<O: SimObserver>(&self, interval: Duration, observer: &mut O) {
        observer.on_start(&self.handle);
        loop {
            let flow = observer.on_frame(&self.handle);
            if flow.is_break() || self.handle.is_shutdown() || self.is_finished() {
                break;
            }
            thread::sleep(interval);
        }
        observer.on_end(&self.handle);
    }

    /// Block until every traveler thread returns on its own.
    ///
    /// All threads are joined even if some fail; the first failure is
    /// reported.
    pub fn join(mut self) -> SimResult<StatusReport> {
        self.join_threads()?;
        Ok(self.handle.status())
    }

    /// [`request_shutdown`](SimHandle::request_shutdown), then
    /// [`join`](Self::join).
    pub fn shutdown(self) -> SimResult<StatusReport> {
        self.handle.request_shutdown();
        self.join()
    }

    fn join_threads(&mut self) -> SimResult<()> {
        let mut first_err = None;
        for (id, handle) in self.threads.drain(..) {
            let err = match handle.join() {
                Ok(Ok(())) => continue,
                Ok(Err(source)) => SimError::Agent { agent: id, source },
                Err(_) => SimError::ThreadPanicked(id),
            };
            warn!(agent = %id, error = %err, "traveler thread failed");
            first_err.get_or_insert(err);
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    // ── Handle delegates ──────────────────────────────────────────────────

    pub fn snapshot_grid(&self) -> GridSnapshot {
        self.handle.snapshot_grid()
    }

    pub fn snapshot_agent(&self, id: AgentId) -> Option<AgentSnapshot> {
        self.handle.snapshot_agent(id)
    }

    pub fn counters(&self) -> Counters {
        self.handle.counters()
    }

    pub fn status(&self) -> StatusReport {
        self.handle.status()
    }

    pub fn speed_up(&self) -> u64 {
        self.handle.speed_up()
    }

    pub fn slow_down(&self) -> u64 {
        self.handle.slow_down()
    }

    pub fn request_shutdown(&self) {
        self.handle.request_shutdown();
    }
}

impl Drop for Sim {
    fn drop(&mut self) {
        if self.threads.is_empty() {
            return;
        }
        self.handle.request_shutdown();
        if let Err(err) = self.join_threads() {
            warn!(error = %err, "traveler failure while dropping simulation");
        }
    }
}

// ── Traveler thread ───────────────────────────────────────────────────────────

/// Counts one traveler thread in `live` from before its spawn until it is
/// dropped: when the thread returns or unwinds, or with the closure of a
/// spawn that failed.
struct LiveThread(Arc<Shared>);

impl LiveThread {
    fn new(shared: Arc<Shared>) -> Self {
        shared.coordinator.thread_started();
        Self(shared)
    }
}

impl Drop for LiveThread {
    fn drop(&mut self) {
        self.0.coordinator.thread_exited();
    }
}

/// Body of one traveler thread: pause, step, repeat until the traveler has
/// left, shutdown is requested, or the iteration cap is hit.
fn run_traveler(shared: &Shared, mut task: TravelerTask, cap: Option<u64>) -> AgentResult<()> {
    let id = task.id();
    loop {
        if !shared.coordinator.pause() {
            return Ok(());
        }
        if cap.is_some_and(|cap| task.iterations() >= cap) {
            info!(agent = %id, iterations = task.iterations(), "iteration cap reached");
            return Ok(());
        }
        match task.step(&shared.world) {
            Ok(StepOutcome::Finished(_)) => {
                shared.coordinator.agent_finished();
                info!(agent = %id, moves = task.moves(), "traveler finished");
                return Ok(());
            }
            Ok(StepOutcome::Idle) => return Ok(()),
            Ok(_) => {}
            Err(err) => {
                error!(agent = %id, error = %err, "traveler stopped");
                return Err(err);
            }
        }
    }
}
