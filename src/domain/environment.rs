/// Environment: the grid plus the live hazard and gold sets.
///
/// Two layers, like a level loaded from disk:
///   - `level` : the stored layout. Fixed for the life of the environment.
///   - `holes` / `wumpus` / `golds` : the live sets, shrinking as the
///     player kills wumpus and captures gold.
///
/// `reset()` copies `level` back into the live sets and builds a fresh grid.

use std::collections::BTreeSet;

use rand::Rng;

use super::coord::Coord;
use super::grid::Grid;
use super::layout::{Layout, LayoutCounts, LayoutError};

/// Proximity cues perceived in a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cues {
    /// A hole is next door.
    pub tremor: bool,
    /// A wumpus is next door.
    pub roar: bool,
    /// Gold is next door.
    pub glitter: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DangerLevel {
    Low,
    High,
}

const HIGH_DANGER_WUMPUS: usize = 5;

#[derive(Clone, Debug)]
pub struct Environment {
    pub grid: Grid,
    level: Layout,
    holes: BTreeSet<Coord>,
    wumpus: BTreeSet<Coord>,
    golds: BTreeSet<Coord>,
    /// Render everything regardless of fog. Never touches `grid`.
    pub reveal_all: bool,
}

// ── Construction / reset ──

impl Environment {
    /// Random layout for a `width` x `height` grid.
    pub fn initialize<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        counts: LayoutCounts,
        rng: &mut R,
    ) -> Result<Self, LayoutError> {
        let level = Layout::random(width, height, counts, rng)?;
        Ok(Environment::from_layout(width, height, level))
    }

    /// Environment over a known layout. The layout is trusted; run
    /// `Layout::validate` first when it came from outside.
    pub fn from_layout(width: usize, height: usize, level: Layout) -> Self {
        let mut env = Environment {
            grid: Grid::new(width, height),
            level,
            holes: BTreeSet::new(),
            wumpus: BTreeSet::new(),
            golds: BTreeSet::new(),
            reveal_all: false,
        };
        env.reset();
        env
    }

    /// Back to the stored layout with a fresh fog.
    pub fn reset(&mut self) {
        self.grid = Grid::new(self.grid.width, self.grid.height);
        self.holes = self.level.holes.clone();
        self.wumpus = self.level.wumpus.clone();
        self.golds = self.level.golds.clone();
        self.reveal_all = false;
    }

    /// The stored layout.
    pub fn level(&self) -> &Layout {
        &self.level
    }
}

// ── Removal ──

impl Environment {
    /// Kill the wumpus at `c`. Holes are permanent and are never removed.
    /// Returns false (and changes nothing) if no wumpus is there.
    pub fn remove_hazard_at(&mut self, c: Coord) -> bool {
        if !self.wumpus.remove(&c) {
            return false;
        }
        self.grid.reveal(c);
        true
    }

    /// Returns false (and changes nothing) if no gold is there.
    pub fn remove_gold_at(&mut self, c: Coord) -> bool {
        self.golds.remove(&c)
    }
}

// ── Queries ──

impl Environment {
    #[inline]
    pub fn is_hole_at(&self, c: Coord) -> bool {
        self.holes.contains(&c)
    }

    #[inline]
    pub fn is_wumpus_at(&self, c: Coord) -> bool {
        self.wumpus.contains(&c)
    }

    #[inline]
    pub fn is_hazard_at(&self, c: Coord) -> bool {
        self.is_hole_at(c) || self.is_wumpus_at(c)
    }

    #[inline]
    pub fn is_gold_at(&self, c: Coord) -> bool {
        self.golds.contains(&c)
    }

    pub fn gold_remaining(&self) -> usize {
        self.golds.len()
    }

    pub fn wumpus_remaining(&self) -> usize {
        self.wumpus.len()
    }

    pub fn cues_at(&self, c: Coord) -> Cues {
        let mut cues = Cues::default();
        for n in self.grid.neighbors(c) {
            cues.tremor |= self.is_hole_at(n);
            cues.roar |= self.is_wumpus_at(n);
            cues.glitter |= self.is_gold_at(n);
        }
        cues
    }

    pub fn danger_level(&self) -> DangerLevel {
        if self.wumpus.len() > HIGH_DANGER_WUMPUS { DangerLevel::High } else { DangerLevel::Low }
    }

    /// Should the renderer show this cell's contents?
    pub fn is_shown(&self, c: Coord) -> bool {
        self.reveal_all || self.grid.is_visible(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 5x4 fixture:
    /// ```text
    ///   P . . . .
    ///   . . O . .
    ///   . W . $ .
    ///   . . . . $
    /// ```
    fn fixture() -> Environment {
        let level = Layout {
            holes: [Coord::new(1, 2)].into_iter().collect(),
            wumpus: [Coord::new(2, 1)].into_iter().collect(),
            golds: [Coord::new(2, 3), Coord::new(3, 4)].into_iter().collect(),
        };
        Environment::from_layout(5, 4, level)
    }

    #[test]
    fn membership_queries() {
        let env = fixture();
        assert!(env.is_hole_at(Coord::new(1, 2)));
        assert!(env.is_hazard_at(Coord::new(1, 2)));
        assert!(env.is_wumpus_at(Coord::new(2, 1)));
        assert!(env.is_hazard_at(Coord::new(2, 1)));
        assert!(env.is_gold_at(Coord::new(2, 3)));
        assert!(!env.is_hazard_at(Coord::new(2, 3)));
        assert!(!env.is_gold_at(Coord::START));
    }

    #[test]
    fn remove_gold_is_idempotent() {
        let mut env = fixture();
        assert!(env.remove_gold_at(Coord::new(2, 3)));
        assert_eq!(env.gold_remaining(), 1);
        assert!(!env.remove_gold_at(Coord::new(2, 3)));
        assert_eq!(env.gold_remaining(), 1);
        assert!(!env.remove_gold_at(Coord::new(0, 4)));
        assert_eq!(env.gold_remaining(), 1);
    }

    #[test]
    fn remove_hazard_kills_wumpus_once() {
        let mut env = fixture();
        let w = Coord::new(2, 1);
        assert!(!env.grid.is_visible(w));
        assert!(env.remove_hazard_at(w));
        assert!(!env.is_wumpus_at(w));
        assert!(env.grid.is_visible(w));
        assert!(!env.remove_hazard_at(w));
        assert_eq!(env.wumpus_remaining(), 0);
    }

    #[test]
    fn holes_are_not_removable() {
        let mut env = fixture();
        assert!(!env.remove_hazard_at(Coord::new(1, 2)));
        assert!(env.is_hole_at(Coord::new(1, 2)));
    }

    #[test]
    fn reset_restores_stored_layout() {
        let mut env = fixture();
        env.remove_gold_at(Coord::new(2, 3));
        env.remove_hazard_at(Coord::new(2, 1));
        env.grid.reveal(Coord::new(3, 3));
        env.reveal_all = true;
        env.reset();
        assert_eq!(env.wumpus_remaining(), env.level().wumpus.len());
        assert_eq!(env.gold_remaining(), 2);
        assert!(env.is_wumpus_at(Coord::new(2, 1)));
        assert_eq!(env.grid.reveal_count(), 1);
        assert!(!env.reveal_all);
    }

    #[test]
    fn cues_next_to_hazards() {
        let env = fixture();
        // (1,1) touches the hole at (1,2) and the wumpus at (2,1)
        let c = env.cues_at(Coord::new(1, 1));
        assert!(c.tremor && c.roar && !c.glitter);
        // (2,2) touches hole (1,2), wumpus (2,1), gold (2,3)
        let c = env.cues_at(Coord::new(2, 2));
        assert!(c.tremor && c.roar && c.glitter);
        // diagonal does not count
        assert_eq!(env.cues_at(Coord::START), Cues::default());
    }

    #[test]
    fn danger_level_threshold() {
        let mut level = Layout {
            golds: [Coord::new(0, 4)].into_iter().collect(),
            ..Layout::default()
        };
        for col in 0..5 {
            level.wumpus.insert(Coord::new(3, col));
        }
        let env = Environment::from_layout(5, 4, level.clone());
        assert_eq!(env.danger_level(), DangerLevel::Low);
        level.wumpus.insert(Coord::new(2, 4));
        let env = Environment::from_layout(5, 4, level);
        assert_eq!(env.danger_level(), DangerLevel::High);
    }
}
