//! `TravelerTask`: the per-thread wander / exit state machine.
//!
//! # One wandering step
//!
//! 1. Read head position and facing under the traveler lock; draw a
//!    direction; release the traveler lock.
//! 2. Off-grid target → `Blocked(Edge)`.
//! 3. Classify the target under its own cell lock: walls and occupied cells
//!    block, the exit switches to [`Phase::Exiting`], a partition block is
//!    pushed (after the cell lock is released, since the slide locks that
//!    cell itself).
//! 4. Lock `{head, target, tail}` as one set, re-check the target is still
//!    `Free` (another traveler may have won it since step 3), then shift the
//!    body by one cell under the traveler lock.
//!
//! Only this task mutates its traveler's body, so head and tail positions
//! read in steps 1 and 4 cannot change before the cell locks are taken.
//!
//! # Lock order
//!
//! `partition → cells (row-major) → traveler`.  The traveler lock is only
//! ever taken last, or alone.

use std::sync::Arc;

use tracing::{debug, trace};

use tv_core::{AgentId, AgentRng, Direction, PartitionId, Position};
use tv_grid::{CellState, World};

use crate::{AgentError, AgentResult, MovePolicy, Segment, Traveler};

/// Lifecycle phase of a traveler.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Phase {
    Wandering,
    /// Head reached the exit; segments are being removed tail first.
    Exiting,
    /// Every segment removed.  The thread should end.
    Done,
}

/// Why a wandering step did not move.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BlockReason {
    /// Target lies outside the grid.
    Edge,
    Wall,
    /// Target holds a traveler (possibly this one).
    Occupied,
    /// Target is a partition that could not slide.
    Partition,
    /// Target was free when classified but taken before the move locked it.
    Contested,
}

/// Result of one [`TravelerTask::step`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum StepOutcome {
    /// Head advanced to `to`.
    Moved {
        to:     Position,
        facing: Direction,
        /// Partition pushed out of the way first, if any.
        pushed: Option<PartitionId>,
        /// The body grew by one segment instead of vacating its tail cell.
        grew:   bool,
    },
    Blocked(BlockReason),
    /// Target was the exit; the traveler is now [`Phase::Exiting`].
    ReachedExit,
    /// Tail segment removed and its cell cleared.
    Shrunk(Position),
    /// Last segment removed and its cell cleared; the traveler is done.
    Finished(Position),
    /// Called after [`Phase::Done`]; nothing happened.
    Idle,
}

impl StepOutcome {
    /// The cell this step returned to `Free` during the exit protocol.
    pub fn cleared(self) -> Option<Position> {
        match self {
            StepOutcome::Shrunk(p) | StepOutcome::Finished(p) => Some(p),
            _ => None,
        }
    }
}

/// State owned by one traveler thread.
pub struct TravelerTask {
    traveler:   Arc<Traveler>,
    rng:        AgentRng,
    policy:     MovePolicy,
    phase:      Phase,
    moves:      u64,
    iterations: u64,
}

impl TravelerTask {
    pub fn new(traveler: Arc<Traveler>, rng: AgentRng, policy: MovePolicy) -> Self {
        Self {
            traveler,
            rng,
            policy,
            phase:      Phase::Wandering,
            moves:      0,
            iterations: 0,
        }
    }

    #[inline]
    pub fn id(&self) -> AgentId {
        self.traveler.id()
    }

    #[inline]
    pub fn traveler(&self) -> &Arc<Traveler> {
        &self.traveler
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Successful moves so far.
    #[inline]
    pub fn moves(&self) -> u64 {
        self.moves
    }

    /// Calls to [`step`](Self::step) so far, blocked ones included.
    #[inline]
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Run one loop iteration against `world`.
    pub fn step(&mut self, world: &World) -> AgentResult<StepOutcome> {
        self.iterations += 1;
        match self.phase {
            Phase::Wandering => self.wander(world),
            Phase::Exiting   => self.shrink(world),
            Phase::Done      => Ok(StepOutcome::Idle),
        }
    }

    // ── Wandering ─────────────────────────────────────────────────────────

    fn wander(&mut self, world: &World) -> AgentResult<StepOutcome> {
        let id = self.id();
        let head = self.traveler.head().ok_or(AgentError::EmptyBody(id))?;
        let dir = self.policy.choose_direction(head.facing, &mut self.rng);

        let Some(target) = head.position.step(dir, world.grid.rows(), world.grid.cols()) else {
            return Ok(StepOutcome::Blocked(BlockReason::Edge));
        };

        let classified = world.grid.lock_cell(target)?.state();
        let pushed = match classified {
            CellState::Free => None,
            CellState::Wall => return Ok(StepOutcome::Blocked(BlockReason::Wall)),
            CellState::Traveler(_) => return Ok(StepOutcome::Blocked(BlockReason::Occupied)),
            CellState::Exit => {
                self.phase = Phase::Exiting;
                debug!(agent = %id, exit = %target, "reached exit");
                return Ok(StepOutcome::ReachedExit);
            }
            CellState::VerticalPartition(pid) | CellState::HorizontalPartition(pid) => {
                if !world.slide(pid, dir)? {
                    return Ok(StepOutcome::Blocked(BlockReason::Partition));
                }
                Some(pid)
            }
        };

        self.advance(world, target, dir, pushed)
    }

    fn advance(
        &mut self,
        world:  &World,
        target: Position,
        dir:    Direction,
        pushed: Option<PartitionId>,
    ) -> AgentResult<StepOutcome> {
        let id = self.id();
        let (head, tail) = self.traveler.ends().ok_or(AgentError::EmptyBody(id))?;

        let mut cells = world.grid.lock_cells([head, target, tail])?;
        if !cells.state(target)?.is_free() {
            trace!(agent = %id, %target, "lost the race for target");
            return Ok(StepOutcome::Blocked(BlockReason::Contested));
        }

        let grew = self.policy.grows_on(self.moves + 1);
        {
            let mut body = self.traveler.body();
            let vacated = *body.last().ok_or(AgentError::EmptyBody(id))?;
            for i in (1..body.len()).rev() {
                body[i] = body[i - 1];
            }
            body[0] = Segment::new(target, dir);

            if grew {
                body.push(vacated);
            } else {
                cells.set(vacated.position, CellState::Free)?;
            }
            cells.set(target, CellState::Traveler(id))?;
        }

        self.moves += 1;
        trace!(agent = %id, from = %head, to = %target, %dir, "moved");
        Ok(StepOutcome::Moved { to: target, facing: dir, pushed, grew })
    }

    // ── Exiting ───────────────────────────────────────────────────────────

    fn shrink(&mut self, world: &World) -> AgentResult<StepOutcome> {
        let id = self.id();
        let (_, tail) = self.traveler.ends().ok_or(AgentError::EmptyBody(id))?;

        let mut cell = world.grid.lock_cell(tail)?;
        let remaining = {
            let mut body = self.traveler.body();
            body.pop();
            body.len()
        };
        cell.set(CellState::Free);
        drop(cell);

        if remaining == 0 {
            self.phase = Phase::Done;
            debug!(agent = %id, moves = self.moves, "left through the exit");
            Ok(StepOutcome::Finished(tail))
        } else {
            Ok(StepOutcome::Shrunk(tail))
        }
    }
}
