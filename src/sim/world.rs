/// WorldState: the complete snapshot of a running game.
///
/// Owns every mutable entity. Behaviour lives elsewhere:
///   - `sim::step` advances it one tick
///   - `sim::step::apply_command` applies player input between ticks
///   - `ui::renderer` reads it
///
/// `occupied()` is the single source of truth for "cells placement must avoid".

use std::collections::{HashSet, VecDeque};

use rand::Rng;

use crate::config::RulesConfig;
use crate::domain::entity::{Bounds, Direction, Point, Portal};
use crate::error::Result;
use super::placement;

#[derive(Clone, Debug)]
pub struct WorldState {
    pub bounds: Bounds,
    pub rules: RulesConfig,

    /// Head first.
    pub snake: VecDeque<Point>,
    /// Direction the next tick moves in.
    pub direction: Direction,
    /// Direction the last tick moved in; turns are checked against this.
    pub heading: Direction,

    pub food: Point,
    /// Append-only.
    pub obstacles: Vec<Point>,
    pub portal: Portal,

    pub score: u32,
    pub high_score: u32,
    pub level: u32,
    pub tick: u64,

    pub paused: bool,
    pub game_over: bool,
}

impl WorldState {
    /// Fresh game: one-cell snake in the centre heading right, one obstacle
    /// batch, then the portal pair, then food, each avoiding what came before.
    pub fn new<R: Rng + ?Sized>(
        bounds: Bounds,
        rules: &RulesConfig,
        high_score: u32,
        rng: &mut R,
    ) -> Result<Self> {
        let start = bounds.center();
        let mut occupied: HashSet<Point> = HashSet::from([start]);

        let obstacles = placement::place_batch(rng, &bounds, &mut occupied, rules.obstacle_batch);

        let entry = placement::random_free_cell(rng, &bounds, &occupied)?;
        occupied.insert(entry);
        let exit = placement::random_free_cell(rng, &bounds, &occupied)?;
        occupied.insert(exit);

        let food = placement::random_free_cell(rng, &bounds, &occupied)?;

        Ok(WorldState {
            bounds,
            rules: rules.clone(),
            snake: VecDeque::from([start]),
            direction: Direction::Right,
            heading: Direction::Right,
            food,
            obstacles,
            portal: Portal { entry, exit },
            score: 0,
            high_score,
            level: 0,
            tick: 0,
            paused: false,
            game_over: false,
        })
    }

    pub fn head(&self) -> Point {
        // The snake is never empty: it starts with one cell and a move
        // always pushes before it pops.
        self.snake.front().copied().unwrap_or_else(|| self.bounds.center())
    }

    pub fn is_obstacle(&self, p: Point) -> bool {
        self.obstacles.contains(&p)
    }

    /// Every cell new food or obstacles must avoid.
    pub fn occupied(&self) -> HashSet<Point> {
        let mut cells: HashSet<Point> = self.snake.iter().copied().collect();
        cells.extend(self.obstacles.iter().copied());
        cells.insert(self.food);
        cells.insert(self.portal.entry);
        cells.insert(self.portal.exit);
        cells
    }
}
