/// Level layout: where the holes, wumpus and gold are.
///
/// A layout is what `reset` returns to and what a share link carries.
/// Placement rules:
///   - every coordinate inside the grid
///   - holes and wumpus never share a cell
///   - gold never sits on a hazard
///   - the start cell is empty
///   - at least one gold (otherwise there is nothing to win)
///
/// Random layouts additionally keep the start cell's neighbours clear so the
/// first move is always survivable.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::coord::Coord;
use super::grid::Grid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("coordinate {0} is outside the {1}x{2} grid")]
    OutOfBounds(Coord, usize, usize),

    #[error("cell {0} holds more than one entity")]
    Overlap(Coord),

    #[error("the start cell must be empty")]
    StartOccupied,

    #[error("layout has no gold")]
    NoGold,

    #[error("grid too crowded: {needed} entities but only {available} free cells")]
    TooCrowded { needed: usize, available: usize },
}

/// How many of each entity a random layout gets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutCounts {
    pub holes: usize,
    pub wumpus: usize,
    pub golds: usize,
}

impl LayoutCounts {
    /// Saturates, so absurd counts compare as "too many" instead of wrapping.
    pub fn total(&self) -> usize {
        self.holes.saturating_add(self.wumpus).saturating_add(self.golds)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub holes: BTreeSet<Coord>,
    #[serde(default)]
    pub golds: BTreeSet<Coord>,
    #[serde(default)]
    pub wumpus: BTreeSet<Coord>,
}

/// Number of cells a random layout may use on a `width` x `height` grid.
/// Counted arithmetically; no grid is built.
pub fn free_cells(width: usize, height: usize) -> usize {
    if width == 0 || height == 0 {
        return 0;
    }
    // start cell plus its right and lower neighbours, when they exist
    let safe = 1 + usize::from(width > 1) + usize::from(height > 1);
    width.saturating_mul(height).saturating_sub(safe)
}

fn in_safe_zone(c: Coord) -> bool {
    c == Coord::START || c.is_adjacent(Coord::START)
}

impl Layout {
    /// Scatter entities over the grid, outside the start cell's safe zone.
    pub fn random<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        counts: LayoutCounts,
        rng: &mut R,
    ) -> Result<Self, LayoutError> {
        if counts.golds == 0 {
            return Err(LayoutError::NoGold);
        }
        let grid = Grid::new(width, height);
        let mut cells: Vec<Coord> = grid.cells().filter(|c| !in_safe_zone(*c)).collect();
        if counts.total() > cells.len() {
            return Err(LayoutError::TooCrowded { needed: counts.total(), available: cells.len() });
        }

        cells.shuffle(rng);
        let mut it = cells.into_iter();
        let holes = it.by_ref().take(counts.holes).collect();
        let wumpus = it.by_ref().take(counts.wumpus).collect();
        let golds = it.by_ref().take(counts.golds).collect();

        Ok(Layout { holes, golds, wumpus })
    }

    /// Check the placement rules against a grid of the given size.
    pub fn validate(&self, width: usize, height: usize) -> Result<(), LayoutError> {
        let grid = Grid::new(width, height);
        let all = self.holes.iter().chain(&self.wumpus).chain(&self.golds);
        for &c in all {
            if !grid.contains(c) {
                return Err(LayoutError::OutOfBounds(c, width, height));
            }
            if c == Coord::START {
                return Err(LayoutError::StartOccupied);
            }
        }
        if let Some(&c) = self.holes.intersection(&self.wumpus).next() {
            return Err(LayoutError::Overlap(c));
        }
        for &g in &self.golds {
            if self.holes.contains(&g) || self.wumpus.contains(&g) {
                return Err(LayoutError::Overlap(g));
            }
        }
        if self.golds.is_empty() {
            return Err(LayoutError::NoGold);
        }
        Ok(())
    }

    pub fn counts(&self) -> LayoutCounts {
        LayoutCounts {
            holes: self.holes.len(),
            wumpus: self.wumpus.len(),
            golds: self.golds.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const COUNTS: LayoutCounts = LayoutCounts { holes: 10, wumpus: 4, golds: 3 };

    fn layout(holes: &[(usize, usize)], wumpus: &[(usize, usize)], golds: &[(usize, usize)]) -> Layout {
        let set = |v: &[(usize, usize)]| v.iter().map(|&(r, c)| Coord::new(r, c)).collect();
        Layout { holes: set(holes), golds: set(golds), wumpus: set(wumpus) }
    }

    #[test]
    fn random_respects_counts_and_rules() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let l = Layout::random(15, 8, COUNTS, &mut rng).unwrap();
            assert_eq!(l.counts(), COUNTS);
            assert_eq!(l.validate(15, 8), Ok(()));
            for c in l.holes.iter().chain(&l.wumpus) {
                assert!(!c.is_adjacent(Coord::START), "hazard next to start: {c}");
            }
        }
    }

    #[test]
    fn random_is_reproducible_with_seed() {
        let a = Layout::random(15, 8, COUNTS, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = Layout::random(15, 8, COUNTS, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn random_too_crowded() {
        // 3x3 grid: 9 cells, 3 in the safe zone, 6 free
        assert_eq!(free_cells(3, 3), 6);
        let counts = LayoutCounts { holes: 4, wumpus: 2, golds: 1 };
        let err = Layout::random(3, 3, counts, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert_eq!(err, LayoutError::TooCrowded { needed: 7, available: 6 });
    }

    #[test]
    fn free_cells_on_narrow_and_huge_grids() {
        assert_eq!(free_cells(0, 5), 0);
        assert_eq!(free_cells(1, 1), 0);
        assert_eq!(free_cells(1, 4), 2);
        assert_eq!(free_cells(15, 8), 117);
        assert_eq!(free_cells(usize::MAX, usize::MAX), usize::MAX - 3);
        // agrees with counting the cells one by one
        let grid = Grid::new(4, 3);
        assert_eq!(free_cells(4, 3), grid.cells().filter(|c| !in_safe_zone(*c)).count());
    }

    #[test]
    fn total_saturates() {
        let counts = LayoutCounts { holes: usize::MAX, wumpus: usize::MAX, golds: 1 };
        assert_eq!(counts.total(), usize::MAX);
    }

    #[test]
    fn random_needs_gold() {
        let counts = LayoutCounts { holes: 1, wumpus: 1, golds: 0 };
        let err = Layout::random(5, 5, counts, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert_eq!(err, LayoutError::NoGold);
    }

    #[test]
    fn validate_rejects_out_of_bounds() {
        let l = layout(&[(8, 0)], &[], &[(1, 1)]);
        assert_eq!(l.validate(15, 8), Err(LayoutError::OutOfBounds(Coord::new(8, 0), 15, 8)));
    }

    #[test]
    fn validate_rejects_overlap() {
        let l = layout(&[(2, 2)], &[(2, 2)], &[(1, 1)]);
        assert_eq!(l.validate(15, 8), Err(LayoutError::Overlap(Coord::new(2, 2))));
        let l = layout(&[], &[(3, 3)], &[(3, 3)]);
        assert_eq!(l.validate(15, 8), Err(LayoutError::Overlap(Coord::new(3, 3))));
    }

    #[test]
    fn validate_rejects_start_and_empty_gold() {
        let l = layout(&[(0, 0)], &[], &[(1, 1)]);
        assert_eq!(l.validate(15, 8), Err(LayoutError::StartOccupied));
        let l = layout(&[(2, 2)], &[], &[]);
        assert_eq!(l.validate(15, 8), Err(LayoutError::NoGold));
    }

    #[test]
    fn hand_made_layout_may_touch_start_neighbors() {
        // only random layouts keep the safe zone; links may place hazards anywhere but (0,0)
        let l = layout(&[(0, 1)], &[], &[(1, 1)]);
        assert_eq!(l.validate(15, 8), Ok(()));
    }
}
