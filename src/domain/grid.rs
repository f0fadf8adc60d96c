/// Grid dimensions and the fog-of-war visibility matrix.
///
/// Visibility only ever goes unseen → seen. There is no way to hide a cell
/// again; a new game gets a new `Grid`.

use super::coord::{Coord, Direction};

#[derive(Clone, Debug)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    /// `visible[row][col]`
    visible: Vec<Vec<bool>>,
}

impl Grid {
    /// Fresh grid with only the start cell revealed.
    pub fn new(width: usize, height: usize) -> Self {
        let mut grid = Grid {
            width,
            height,
            visible: vec![vec![false; width]; height],
        };
        grid.reveal(Coord::START);
        grid
    }

    #[inline]
    pub fn contains(&self, c: Coord) -> bool {
        c.row < self.height && c.col < self.width
    }

    #[inline]
    pub fn is_visible(&self, c: Coord) -> bool {
        self.contains(c) && self.visible[c.row][c.col]
    }

    /// Mark a cell as seen. Returns true if it was unseen before.
    /// Out-of-bounds coordinates are ignored.
    pub fn reveal(&mut self, c: Coord) -> bool {
        if !self.contains(c) || self.visible[c.row][c.col] {
            return false;
        }
        self.visible[c.row][c.col] = true;
        true
    }

    pub fn reveal_count(&self) -> usize {
        self.visible.iter().flatten().filter(|v| **v).count()
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// The cell one step from `c` in `dir`, if it lies inside the grid.
    pub fn step(&self, c: Coord, dir: Direction) -> Option<Coord> {
        c.offset(dir).filter(|n| self.contains(*n))
    }

    /// In-bounds orthogonal neighbours of `c`.
    pub fn neighbors(&self, c: Coord) -> impl Iterator<Item = Coord> + '_ {
        Direction::ALL.into_iter().filter_map(move |d| self.step(c, d))
    }

    pub fn cells(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.height).flat_map(move |row| (0..self.width).map(move |col| Coord { row, col }))
    }
}
