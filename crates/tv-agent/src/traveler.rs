//! Traveler state shared between its own thread and observers.

use parking_lot::{Mutex, MutexGuard};

use tv_core::{AgentId, Color, Direction, Position};

/// One occupied cell of a traveler's body.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub position: Position,
    /// Direction the segment was heading when it entered `position`.
    pub facing:   Direction,
}

impl Segment {
    #[inline]
    pub const fn new(position: Position, facing: Direction) -> Self {
        Self { position, facing }
    }
}

/// A traveler: identity, display color, and its body behind a private lock.
///
/// The body is ordered head first.  Only the traveler's own
/// [`TravelerTask`][crate::TravelerTask] mutates it; observers take the lock
/// just long enough to copy it out.
pub struct Traveler {
    id:    AgentId,
    color: Color,
    body:  Mutex<Vec<Segment>>,
}

impl Traveler {
    pub fn new(id: AgentId, color: Color, body: Vec<Segment>) -> Self {
        Self { id, color, body: Mutex::new(body) }
    }

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn head(&self) -> Option<Segment> {
        self.body.lock().first().copied()
    }

    /// Head and tail positions read under one lock acquisition.
    pub fn ends(&self) -> Option<(Position, Position)> {
        let body = self.body.lock();
        Some((body.first()?.position, body.last()?.position))
    }

    pub fn len(&self) -> usize {
        self.body.lock().len()
    }

    /// `true` once every segment has been removed.
    pub fn is_empty(&self) -> bool {
        self.body.lock().is_empty()
    }

    /// Copy of the body and color, taken under the traveler lock.
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id:       self.id,
            color:    self.color,
            segments: self.body.lock().clone(),
        }
    }

    pub(crate) fn body(&self) -> MutexGuard<'_, Vec<Segment>> {
        self.body.lock()
    }
}

/// Observer-side copy of one traveler.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentSnapshot {
    pub id:       AgentId,
    pub color:    Color,
    /// Head first.  Empty once the traveler has left through the exit.
    pub segments: Vec<Segment>,
}
