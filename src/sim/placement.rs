/// Randomized, collision-free placement of food, obstacles and portals.
///
/// Sampling is uniform over the interior (the border ring is never used).
/// After a bounded number of misses the free cells are enumerated and one is
/// chosen directly, so a nearly full board still terminates and a full board
/// reports `NoFreeCell` instead of spinning.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::entity::{Bounds, Point};
use crate::error::{GameError, Result};

/// Misses allowed per interior cell before falling back to a scan.
const ATTEMPTS_PER_CELL: usize = 4;

pub fn random_free_cell<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: &Bounds,
    occupied: &HashSet<Point>,
) -> Result<Point> {
    let attempts = bounds.interior_area() * ATTEMPTS_PER_CELL;
    for _ in 0..attempts {
        let p = Point::new(
            rng.gen_range(1..bounds.width() - 1),
            rng.gen_range(1..bounds.height() - 1),
        );
        if !occupied.contains(&p) {
            return Ok(p);
        }
    }

    let free: Vec<Point> = bounds
        .interior_cells()
        .filter(|p| !occupied.contains(p))
        .collect();
    free.choose(rng).copied().ok_or(GameError::NoFreeCell)
}

/// Place up to `count` points, each disjoint from `occupied` and from each
/// other. Newly placed points are added to `occupied`.
///
/// Stops early when the interior runs out of room.
pub fn place_batch<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: &Bounds,
    occupied: &mut HashSet<Point>,
    count: usize,
) -> Vec<Point> {
    let mut placed = Vec::with_capacity(count);
    for _ in 0..count {
        match random_free_cell(rng, bounds, occupied) {
            Ok(p) => {
                occupied.insert(p);
                placed.push(p);
            }
            Err(_) => break,
        }
    }
    placed
}
