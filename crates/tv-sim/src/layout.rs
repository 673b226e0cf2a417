//! Initial world layout: exit, walls, partitions, and traveler placement.
//!
//! A run either supplies an explicit [`Layout`] (built with
//! [`LayoutBuilder`]) or lets [`generate`] lay out a random one from the
//! run's [`SimRng`].  Both operate on the `World` before any traveler thread
//! exists, so every cell lock taken here is uncontended.
//!
//! # Random layout
//!
//! | Item       | Count               | Length                       |
//! |------------|---------------------|------------------------------|
//! | exit       | 1                   | —                            |
//! | walls      | `(rows + cols) / 4` | `3 ..= span / 3`             |
//! | partitions | `(rows + cols) / 4` | `3 ..= span / 3`             |
//!
//! `span` is the grid dimension along the line's orientation.  Each line gets
//! [`MAX_TRIES`] random placements; one that would overlap anything already
//! laid is dropped.  Grids too small for a length-3 line get none.

use tracing::{debug, trace};

use tv_core::{AgentId, Direction, Orientation, Position, SimRng};
use tv_grid::{CellState, GridError, World};
use tv_agent::Segment;

use crate::{SimError, SimResult};

/// Shortest wall or partition the generator lays.
pub const MIN_LINE_LENGTH: u32 = 3;

/// Random placements tried per wall or partition before giving up on it.
pub const MAX_TRIES: u32 = 20;

/// Random draws tried before falling back to scanning for a free cell.
const FREE_CELL_DRAWS: u32 = 64;

// ── Layout ────────────────────────────────────────────────────────────────────

/// Straight run of cells starting at `start`, extending `length` cells along
/// `orientation.extent()`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub orientation: Orientation,
    pub start:       Position,
    pub length:      u32,
}

impl Line {
    /// Covered positions, or `None` if the line leaves a `rows × cols` grid.
    pub fn cells(&self, rows: u32, cols: u32) -> Option<Vec<Position>> {
        let mut out = Vec::with_capacity(self.length as usize);
        let mut pos = self.start;
        for i in 0..self.length {
            if i > 0 {
                pos = pos.step(self.orientation.extent(), rows, cols)?;
            } else if pos.row >= rows || pos.col >= cols {
                return None;
            }
            out.push(pos);
        }
        Some(out)
    }
}

/// An explicit layout.  Travelers are `(head, facing)` pairs; leave the list
/// empty to have [`SimBuilder`][crate::SimBuilder] place them at random.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
    pub exit:       Option<Position>,
    pub walls:      Vec<Line>,
    pub partitions: Vec<Line>,
    pub travelers:  Vec<(Position, Direction)>,
}

impl Layout {
    /// Write exit, walls and partitions into `world`.  Travelers are placed
    /// separately by the builder.
    pub fn apply(&self, world: &mut World) -> SimResult<()> {
        if let Some(exit) = self.exit {
            world.place_exit(exit)?;
        }
        let (rows, cols) = (world.grid.rows(), world.grid.cols());
        for line in &self.walls {
            let cells = line.cells(rows, cols).ok_or(GridError::OutOfBounds {
                pos: line.start,
                rows,
                cols,
            })?;
            for pos in cells {
                world.place_wall(pos)?;
            }
        }
        for line in &self.partitions {
            world.partitions.register(&world.grid, line.orientation, line.start, line.length)?;
        }
        Ok(())
    }
}

// ── LayoutBuilder ─────────────────────────────────────────────────────────────

/// Fluent builder for [`Layout`].
///
/// ```rust,ignore
/// let layout = LayoutBuilder::new()
///     .exit(Position::new(4, 4))
///     .wall(Position::new(2, 2))
///     .partition(Orientation::Vertical, Position::new(0, 3), 2)
///     .traveler(Position::new(0, 0), Direction::East)
///     .build();
/// ```
#[derive(Default)]
pub struct LayoutBuilder {
    layout: Layout,
}

impl LayoutBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exit(mut self, pos: Position) -> Self {
        self.layout.exit = Some(pos);
        self
    }

    /// A single wall cell.
    pub fn wall(self, pos: Position) -> Self {
        self.wall_line(Orientation::Horizontal, pos, 1)
    }

    pub fn wall_line(mut self, orientation: Orientation, start: Position, length: u32) -> Self {
        self.layout.walls.push(Line { orientation, start, length });
        self
    }

    pub fn partition(mut self, orientation: Orientation, start: Position, length: u32) -> Self {
        self.layout.partitions.push(Line { orientation, start, length });
        self
    }

    /// A traveler whose head starts at `pos` facing `facing`.
    pub fn traveler(mut self, pos: Position, facing: Direction) -> Self {
        self.layout.travelers.push((pos, facing));
        self
    }

    pub fn build(self) -> Layout {
        self.layout
    }
}

// ── Random generation ─────────────────────────────────────────────────────────

/// Lay a random exit, walls and partitions into an empty `world`.
pub fn generate(world: &mut World, rng: &mut SimRng) -> SimResult<()> {
    let exit = random_free_cell(world, rng, "the exit")?;
    world.place_exit(exit)?;

    let (rows, cols) = (world.grid.rows(), world.grid.cols());
    let count = (rows + cols) / 4;

    let mut walls = 0;
    for _ in 0..count {
        if let Some(line) = find_free_line(world, rng) {
            if let Some(cells) = line.cells(rows, cols) {
                for pos in cells {
                    world.place_wall(pos)?;
                }
                walls += 1;
            }
        }
    }

    let mut partitions = 0;
    for _ in 0..count {
        if let Some(line) = find_free_line(world, rng) {
            world.partitions.register(&world.grid, line.orientation, line.start, line.length)?;
            partitions += 1;
        }
    }

    debug!(%exit, walls, partitions, "random layout generated");
    Ok(())
}

/// Up to [`MAX_TRIES`] random lines; the first whose cells are all free.
fn find_free_line(world: &World, rng: &mut SimRng) -> Option<Line> {
    let (rows, cols) = (world.grid.rows(), world.grid.cols());
    for _ in 0..MAX_TRIES {
        let orientation = if rng.gen_bool(0.5) { Orientation::Vertical } else { Orientation::Horizontal };
        let (span, across) = match orientation {
            Orientation::Vertical   => (rows, cols),
            Orientation::Horizontal => (cols, rows),
        };
        let max_len = span / 3;
        if max_len < MIN_LINE_LENGTH {
            continue;
        }
        let length = rng.gen_range(MIN_LINE_LENGTH..=max_len);
        let along = rng.gen_range(0..=span - length);
        let other = rng.gen_range(0..across);
        let start = match orientation {
            Orientation::Vertical   => Position::new(along, other),
            Orientation::Horizontal => Position::new(other, along),
        };
        let line = Line { orientation, start, length };

        let free = line.cells(rows, cols).is_some_and(|cells| {
            cells
                .iter()
                .all(|&p| world.grid.lock_cell(p).is_ok_and(|c| c.state().is_free()))
        });
        if free {
            return Some(line);
        }
        trace!(?line, "line placement rejected");
    }
    None
}

/// A uniformly random free cell.  Falls back to a scan once random draws
/// keep hitting occupied cells.
pub fn random_free_cell(world: &World, rng: &mut SimRng, what: &'static str) -> SimResult<Position> {
    let (rows, cols) = (world.grid.rows(), world.grid.cols());
    for _ in 0..FREE_CELL_DRAWS {
        let pos = Position::new(rng.gen_range(0..rows), rng.gen_range(0..cols));
        if world.grid.lock_cell(pos)?.state().is_free() {
            return Ok(pos);
        }
    }
    let free = world.grid.free_cells();
    if free.is_empty() {
        return Err(SimError::NoFreeCell { what });
    }
    Ok(free[rng.gen_range(0..free.len())])
}

// ── Traveler bodies ───────────────────────────────────────────────────────────

/// Occupy `head` for `agent` and extend the body behind it, one free
/// neighbour of the current tail at a time, up to `segments` cells in total.
///
/// The head cell must be free.  The body stops short if the tail runs out
/// of free neighbours.  Each added segment faces the segment in front of it.
pub fn place_body(
    world:    &World,
    agent:    AgentId,
    head:     Position,
    facing:   Direction,
    segments: u32,
) -> SimResult<Vec<Segment>> {
    let prior = world.grid.lock_cell(head)?.try_occupy(agent);
    if prior != CellState::Free {
        return Err(GridError::NotFree { pos: head, state: prior }.into());
    }
    let (rows, cols) = (world.grid.rows(), world.grid.cols());
    let mut body = vec![Segment::new(head, facing)];

    while (body.len() as u32) < segments {
        let Some(&tail) = body.last() else { break };
        let behind = tail.facing.opposite();
        let candidates = std::iter::once(behind).chain(Direction::ALL.into_iter().filter(|&d| d != behind));

        let mut added = None;
        for dir in candidates {
            let Some(pos) = tail.position.step(dir, rows, cols) else { continue };
            if world.grid.lock_cell(pos)?.try_occupy(agent) == CellState::Free {
                added = Some(Segment::new(pos, dir.opposite()));
                break;
            }
        }
        match added {
            Some(seg) => body.push(seg),
            None => break,
        }
    }
    Ok(body)
}
