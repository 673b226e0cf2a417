//! Grid geometry: cell positions, cardinal directions, partition orientation.
//!
//! Rows grow northward (row 0 is the southern edge) and columns grow
//! eastward.  `Position` orders row-major, which is the global lock order
//! used by every multi-cell operation in `tv-grid`.

use std::fmt;

/// A `(row, col)` cell address.
///
/// The derived `Ord` compares `row` first, then `col`: row-major order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub row: u32,
    pub col: u32,
}

impl Position {
    #[inline]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// The neighbouring cell one step in `dir`, or `None` if that would leave
    /// a `rows × cols` grid.
    pub fn step(self, dir: Direction, rows: u32, cols: u32) -> Option<Position> {
        let (dr, dc) = dir.offset();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        (row < rows && col < cols).then_some(Position { row, col })
    }

    /// Row-major linear index into a grid with `cols` columns.
    #[inline]
    pub fn linear(self, cols: u32) -> usize {
        self.row as usize * cols as usize + self.col as usize
    }

    /// `true` if the two cells share an edge.
    pub fn is_adjacent(self, other: Position) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// ── Direction ─────────────────────────────────────────────────────────────────

/// One of the four cardinal directions.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    North,
    West,
    South,
    East,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::West,
        Direction::South,
        Direction::East,
    ];

    /// `(row, col)` delta of one step in this direction.
    #[inline]
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (1, 0),
            Direction::South => (-1, 0),
            Direction::East  => (0, 1),
            Direction::West  => (0, -1),
        }
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East  => Direction::West,
            Direction::West  => Direction::East,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::West  => "west",
            Direction::South => "south",
            Direction::East  => "east",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Orientation ───────────────────────────────────────────────────────────────

/// Axis along which a partition's blocks are laid out.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Blocks share a column, consecutive rows.
    Vertical,
    /// Blocks share a row, consecutive columns.
    Horizontal,
}

impl Orientation {
    /// Direction in which consecutive blocks are laid out from the first one.
    #[inline]
    pub fn extent(self) -> Direction {
        match self {
            Orientation::Vertical   => Direction::North,
            Orientation::Horizontal => Direction::East,
        }
    }
}
