/// The player: position, facing, arrows, score.
///
/// Pure state transitions. The player never looks at hazards itself; the
/// step function decides what a move or a shot means for the environment.

use super::coord::{Coord, Direction};
use super::environment::Environment;
use super::grid::Grid;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    Moved(Coord),
    /// Edge of the grid. Facing still turns.
    Blocked,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ArrowOutcome {
    NoArrows,
    /// Arrow spent. `None` target: shot into the wall.
    Fired(Option<Coord>),
}

#[derive(Clone, Debug)]
pub struct Player {
    pub pos: Coord,
    pub facing: Direction,
    pub arrows: u32,
    pub score: u32,
    pub alive: bool,
}

impl Player {
    pub fn new(arrows: u32) -> Self {
        Player {
            pos: Coord::START,
            facing: Direction::Right,
            arrows,
            score: 0,
            alive: true,
        }
    }

    /// Turn to `dir` and step one cell if the grid allows, revealing it.
    pub fn apply_move(&mut self, dir: Direction, grid: &mut Grid) -> MoveOutcome {
        self.facing = dir;
        match grid.step(self.pos, dir) {
            Some(next) => {
                self.pos = next;
                grid.reveal(next);
                MoveOutcome::Moved(next)
            }
            None => MoveOutcome::Blocked,
        }
    }

    /// Spend an arrow toward `dir`. The arrow reaches the adjacent cell only.
    pub fn fire_arrow(&mut self, dir: Direction, grid: &Grid) -> ArrowOutcome {
        if self.arrows == 0 {
            return ArrowOutcome::NoArrows;
        }
        self.arrows -= 1;
        self.facing = dir;
        ArrowOutcome::Fired(grid.step(self.pos, dir))
    }

    /// Pick up gold under the player, if any.
    pub fn attempt_capture(&self, env: &mut Environment) -> Option<Coord> {
        if env.remove_gold_at(self.pos) { Some(self.pos) } else { None }
    }

    /// Score never goes down.
    pub fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }
}
