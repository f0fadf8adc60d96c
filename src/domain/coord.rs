/// Grid coordinates and movement directions.
///
/// A `Coord` is a (row, col) pair. On the wire (share links) it is written
/// as `[col, row]`, the order the browser version of the game used.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const START: Coord = Coord { row: 0, col: 0 };

    pub fn new(row: usize, col: usize) -> Self {
        Coord { row, col }
    }

    /// Neighbouring coordinate in `dir`, or None when it would go below zero.
    /// Upper bounds are the grid's business.
    pub fn offset(self, dir: Direction) -> Option<Coord> {
        let (dr, dc) = dir.delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Some(Coord { row, col })
    }

    pub fn is_adjacent(self, other: Coord) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl From<[usize; 2]> for Coord {
    fn from(a: [usize; 2]) -> Self {
        Coord { row: a[1], col: a[0] }
    }
}

impl From<Coord> for [usize; 2] {
    fn from(c: Coord) -> Self {
        [c.col, c.row]
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up, Direction::Down, Direction::Left, Direction::Right,
    ];

    /// (row delta, col delta)
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up    => (-1, 0),
            Direction::Down  => (1, 0),
            Direction::Left  => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn arrow_glyph(self) -> char {
        match self {
            Direction::Up    => '▲',
            Direction::Down  => '▼',
            Direction::Left  => '◀',
            Direction::Right => '▶',
        }
    }
}
