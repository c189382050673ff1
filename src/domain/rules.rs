/// Game rules as pure functions: turning, walls, leveling, tick pacing.
/// No world state here; the step and the loop feed values in.

use std::time::Duration;

use crate::config::SpeedConfig;
use super::entity::{Bounds, Direction, Point};

/// What the head ran into.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Collision {
    Wall,
    Body,
    Obstacle,
}

/// A turn is legal unless it reverses into the neck.
///
/// `heading` is the direction the snake last moved in, so two quick turns
/// inside one tick cannot fold the head back onto the body.
pub fn accepts_turn(heading: Direction, requested: Direction) -> bool {
    !requested.is_opposite(heading)
}

/// Is `p` a wall hit?
///
/// With an open border the whole `[0, w) x [0, h)` rectangle is playable and
/// only stepping past it kills. With a solid border the ring itself kills.
pub fn hits_wall(bounds: &Bounds, p: Point, solid_border: bool) -> bool {
    if solid_border {
        !bounds.contains_interior(p)
    } else {
        !bounds.contains(p)
    }
}

pub fn level_for_score(score: u32, points_per_level: u32) -> u32 {
    score / points_per_level.max(1)
}

/// Tick interval for a level: `base - level * decrement`, clamped to the
/// minimum, then halved while a direction key is held (if enabled).
pub fn tick_interval(speed: &SpeedConfig, level: u32, key_held: bool) -> Duration {
    let slowdown = speed.level_decrement_ms.saturating_mul(level as u64);
    let ms = speed
        .base_interval_ms
        .saturating_sub(slowdown)
        .max(speed.min_interval_ms);
    if key_held && speed.hold_boost {
        Duration::from_millis((ms / 2).max(1))
    } else {
        Duration::from_millis(ms)
    }
}
