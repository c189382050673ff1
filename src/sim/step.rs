/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Pause / game-over guard
///   2. Candidate head = head + direction
///   3. Wall, body, obstacle collision (first hit wins, nothing else mutates)
///   4. Portal substitution (single hop)
///   5. Move: push head, then either grow (food) or drop the tail
///   6. Scoring, level-up obstacle batch, food respawn
///
/// Input is applied separately through `apply_command`, once per tick,
/// before `step` runs.

use rand::Rng;

use crate::domain::entity::{Direction, Point};
use crate::domain::rules::{self, Collision};
use super::event::GameEvent;
use super::placement;
use super::world::WorldState;

/// Player intent forwarded by the input thread.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Turn(Direction),
    TogglePause,
    Quit,
}

// ══════════════════════════════════════════════════════════════
// Input
// ══════════════════════════════════════════════════════════════

pub fn apply_command(world: &mut WorldState, cmd: Command) {
    match cmd {
        Command::Turn(dir) => {
            if rules::accepts_turn(world.heading, dir) {
                world.direction = dir;
            }
        }
        Command::TogglePause => world.paused = !world.paused,
        Command::Quit => world.game_over = true,
    }
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step<R: Rng + ?Sized>(world: &mut WorldState, rng: &mut R) -> Vec<GameEvent> {
    if world.paused || world.game_over { return vec![]; }

    let mut events = Vec::new();

    let candidate = world.head().step(world.direction);
    if let Some(collision) = detect_collision(world, candidate) {
        crash(world, collision, candidate, &mut events);
        return events;
    }

    let head = world.portal.teleport(candidate);
    if head != candidate {
        events.push(GameEvent::Teleported { from: candidate, to: head });
        // The exit may sit under the body; landing there is still a bite.
        if world.snake.contains(&head) {
            crash(world, Collision::Body, head, &mut events);
            return events;
        }
    }

    world.heading = world.direction;
    world.snake.push_front(head);
    world.tick += 1;
    events.push(GameEvent::Moved { head });

    if head == world.food {
        resolve_food(world, rng, &mut events);
    } else {
        world.snake.pop_back();
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Collision
// ══════════════════════════════════════════════════════════════

fn detect_collision(world: &WorldState, p: Point) -> Option<Collision> {
    if rules::hits_wall(&world.bounds, p, world.rules.solid_border) {
        Some(Collision::Wall)
    } else if world.snake.contains(&p) {
        Some(Collision::Body)
    } else if world.is_obstacle(p) {
        Some(Collision::Obstacle)
    } else {
        None
    }
}

fn crash(world: &mut WorldState, collision: Collision, at: Point, events: &mut Vec<GameEvent>) {
    world.game_over = true;
    events.push(GameEvent::Crashed { collision, at });
}

// ══════════════════════════════════════════════════════════════
// Food, score, level
// ══════════════════════════════════════════════════════════════

fn resolve_food<R: Rng + ?Sized>(world: &mut WorldState, rng: &mut R, events: &mut Vec<GameEvent>) {
    world.score += 1;
    events.push(GameEvent::FoodEaten { at: world.food, score: world.score });

    if world.score > world.high_score {
        world.high_score = world.score;
        events.push(GameEvent::HighScoreBeaten { score: world.score });
    }

    check_level_up(world, rng, events);

    match placement::random_free_cell(rng, &world.bounds, &world.occupied()) {
        Ok(p) => world.food = p,
        Err(_) => {
            world.game_over = true;
            events.push(GameEvent::BoardFull);
        }
    }
}

/// Level = score / points_per_level. Each new level appends one obstacle
/// batch; existing obstacles are never removed.
fn check_level_up<R: Rng + ?Sized>(world: &mut WorldState, rng: &mut R, events: &mut Vec<GameEvent>) {
    let new_level = rules::level_for_score(world.score, world.rules.points_per_level);
    if new_level <= world.level { return; }

    world.level = new_level;
    let mut occupied = world.occupied();
    let batch = placement::place_batch(rng, &world.bounds, &mut occupied, world.rules.obstacle_batch);
    let added = batch.len();
    world.obstacles.extend(batch);
    events.push(GameEvent::LevelUp { level: new_level, obstacles_added: added });
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashSet, VecDeque};

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::config::RulesConfig;
    use crate::domain::entity::{Bounds, Portal};

    /// A 20x12 board with no obstacles, the portal and food parked in the
    /// bottom-right corner area out of the way, and the snake laid out from
    /// `body` (head first) heading right.
    fn world_with(body: &[(i32, i32)]) -> WorldState {
        let bounds = Bounds::new(20, 12).unwrap();
        let rules = RulesConfig { obstacle_batch: 5, points_per_level: 2, solid_border: false };
        let mut rng = StdRng::seed_from_u64(1);
        let mut w = WorldState::new(bounds, &rules, 0, &mut rng).unwrap();
        w.obstacles.clear();
        w.portal = Portal { entry: Point::new(17, 9), exit: Point::new(17, 10) };
        w.food = Point::new(18, 10);
        w.snake = body.iter().map(|&(x, y)| Point::new(x, y)).collect();
        w.direction = Direction::Right;
        w.heading = Direction::Right;
        w
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1234)
    }

    fn body(w: &WorldState) -> Vec<(i32, i32)> {
        w.snake.iter().map(|p| (p.x, p.y)).collect()
    }

    // ── Movement ──

    #[test]
    fn plain_move_keeps_length_and_vacates_tail() {
        let mut w = world_with(&[(5, 5), (4, 5), (3, 5)]);
        let events = step(&mut w, &mut rng());

        assert_eq!(body(&w), vec![(6, 5), (5, 5), (4, 5)]);
        assert!(!w.snake.contains(&Point::new(3, 5)));
        assert_eq!(events, vec![GameEvent::Moved { head: Point::new(6, 5) }]);
        assert!(!w.game_over);
    }

    #[test]
    fn paused_step_is_noop() {
        let mut w = world_with(&[(5, 5), (4, 5)]);
        w.paused = true;
        let before = w.snake.clone();
        assert!(step(&mut w, &mut rng()).is_empty());
        assert_eq!(w.snake, before);
        assert_eq!(w.tick, 0);
    }

    #[test]
    fn game_over_step_is_noop() {
        let mut w = world_with(&[(5, 5)]);
        w.game_over = true;
        assert!(step(&mut w, &mut rng()).is_empty());
        assert_eq!(body(&w), vec![(5, 5)]);
    }

    #[test]
    fn moving_onto_border_is_allowed() {
        let mut w = world_with(&[(18, 5)]);
        step(&mut w, &mut rng());
        assert_eq!(w.head(), Point::new(19, 5));
        assert!(!w.game_over);
    }

    // ── Food ──

    #[test]
    fn eating_grows_by_one_and_respawns_food() {
        let mut w = world_with(&[(5, 5), (4, 5), (3, 5)]);
        w.food = Point::new(6, 5);
        w.obstacles = vec![Point::new(10, 2), Point::new(11, 2)];

        let events = step(&mut w, &mut rng());

        assert_eq!(body(&w), vec![(6, 5), (5, 5), (4, 5), (3, 5)]);
        assert_eq!(w.score, 1);
        assert!(events.contains(&GameEvent::FoodEaten { at: Point::new(6, 5), score: 1 }));
        assert!(!w.snake.contains(&w.food));
        assert!(!w.obstacles.contains(&w.food));
        assert!(!w.portal.contains(w.food));
        assert!(w.bounds.contains_interior(w.food));
    }

    #[test]
    fn high_score_follows_score_only_when_beaten() {
        let mut w = world_with(&[(5, 5)]);
        w.high_score = 1;
        w.food = Point::new(6, 5);
        let events = step(&mut w, &mut rng());
        assert_eq!(w.high_score, 1);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::HighScoreBeaten { .. })));

        w.food = Point::new(7, 5);
        let events = step(&mut w, &mut rng());
        assert_eq!(w.score, 2);
        assert_eq!(w.high_score, 2);
        assert!(events.contains(&GameEvent::HighScoreBeaten { score: 2 }));
    }

    // ── Leveling ──

    /// Point the snake at a free neighbour and drop food there.
    fn feed_next(w: &mut WorldState) {
        let dir = [Direction::Right, Direction::Down, Direction::Up, Direction::Left]
            .into_iter()
            .find(|d| {
                let p = w.head().step(*d);
                rules::accepts_turn(w.heading, *d)
                    && w.bounds.contains_interior(p)
                    && !w.snake.contains(&p)
                    && !w.is_obstacle(p)
                    && !w.portal.contains(p)
            })
            .expect("no free neighbour");
        w.direction = dir;
        w.food = w.head().step(dir);
    }

    #[test]
    fn every_second_point_adds_a_level_and_a_batch() {
        let mut w = world_with(&[(2, 5)]);
        let mut r = rng();
        let mut seen_levels = vec![];

        for i in 0..6 {
            let before = w.obstacles.clone();
            feed_next(&mut w);
            step(&mut w, &mut r);
            assert!(!w.game_over, "crashed on bite {i}");
            assert_eq!(w.score, i + 1);

            // Nothing removed, order preserved.
            assert_eq!(&w.obstacles[..before.len()], &before[..]);
            let expected_level = (i + 1) / 2;
            assert_eq!(w.level, expected_level);
            assert_eq!(w.obstacles.len(), expected_level as usize * 5);
            seen_levels.push(w.level);
        }
        assert_eq!(seen_levels, vec![0, 1, 1, 2, 2, 3]);
    }

    #[test]
    fn level_up_obstacles_avoid_everything() {
        let mut w = world_with(&[(5, 5), (4, 5), (3, 5)]);
        w.score = 1;
        w.food = Point::new(6, 5);
        let events = step(&mut w, &mut rng());

        assert!(events.contains(&GameEvent::LevelUp { level: 1, obstacles_added: 5 }));
        let unique: HashSet<Point> = w.obstacles.iter().copied().collect();
        assert_eq!(unique.len(), 5);
        for o in &w.obstacles {
            assert!(w.bounds.contains_interior(*o));
            assert!(!w.snake.contains(o));
            assert!(!w.portal.contains(*o));
            assert_ne!(*o, w.food);
        }
    }

    // ── Collisions ──

    #[test]
    fn wall_collision_ends_game_without_moving() {
        let mut w = world_with(&[(19, 5), (18, 5)]);
        let events = step(&mut w, &mut rng());

        assert!(w.game_over);
        assert_eq!(body(&w), vec![(19, 5), (18, 5)]);
        assert_eq!(events, vec![GameEvent::Crashed {
            collision: Collision::Wall,
            at: Point::new(20, 5),
        }]);
    }

    #[test]
    fn solid_border_kills_on_ring() {
        let mut w = world_with(&[(18, 5)]);
        w.rules.solid_border = true;
        step(&mut w, &mut rng());
        assert!(w.game_over);
        assert_eq!(w.head(), Point::new(18, 5));
    }

    #[test]
    fn self_collision_ends_game() {
        // Head at (5,5) moving down into its own body at (5,6).
        let mut w = world_with(&[(5, 5), (6, 5), (6, 6), (5, 6), (4, 6)]);
        w.direction = Direction::Down;
        w.heading = Direction::Down;
        let before = w.snake.clone();

        let events = step(&mut w, &mut rng());
        assert!(w.game_over);
        assert_eq!(w.snake, before);
        assert_eq!(events, vec![GameEvent::Crashed {
            collision: Collision::Body,
            at: Point::new(5, 6),
        }]);
    }

    #[test]
    fn obstacle_collision_ends_game() {
        let mut w = world_with(&[(5, 5), (4, 5)]);
        w.obstacles = vec![Point::new(6, 5)];
        w.food = Point::new(6, 5);
        let events = step(&mut w, &mut rng());

        assert!(w.game_over);
        assert_eq!(w.score, 0);
        assert_eq!(body(&w), vec![(5, 5), (4, 5)]);
        assert!(matches!(
            events.as_slice(),
            [GameEvent::Crashed { collision: Collision::Obstacle, .. }]
        ));
    }

    // ── Portals ──

    #[test]
    fn entering_portal_teleports_in_same_tick() {
        let mut w = world_with(&[(5, 5), (4, 5)]);
        w.portal = Portal { entry: Point::new(6, 5), exit: Point::new(12, 8) };

        let events = step(&mut w, &mut rng());
        assert_eq!(w.head(), Point::new(12, 8));
        assert_eq!(body(&w), vec![(12, 8), (5, 5)]);
        assert!(events.contains(&GameEvent::Teleported {
            from: Point::new(6, 5),
            to: Point::new(12, 8),
        }));
    }

    #[test]
    fn exit_cell_teleports_back_to_entry() {
        let mut w = world_with(&[(5, 5)]);
        w.portal = Portal { entry: Point::new(12, 8), exit: Point::new(6, 5) };
        step(&mut w, &mut rng());
        assert_eq!(w.head(), Point::new(12, 8));
    }

    #[test]
    fn food_at_portal_exit_is_eaten_after_teleport() {
        let mut w = world_with(&[(5, 5), (4, 5)]);
        w.portal = Portal { entry: Point::new(6, 5), exit: Point::new(12, 8) };
        w.food = Point::new(12, 8);

        step(&mut w, &mut rng());
        assert_eq!(w.score, 1);
        assert_eq!(body(&w), vec![(12, 8), (5, 5), (4, 5)]);
    }

    #[test]
    fn teleport_does_not_chain() {
        let mut w = world_with(&[(5, 5)]);
        // Landing on the exit must not bounce back through the entry.
        w.portal = Portal { entry: Point::new(6, 5), exit: Point::new(9, 9) };
        step(&mut w, &mut rng());
        assert_eq!(w.head(), Point::new(9, 9));
        step(&mut w, &mut rng());
        assert_eq!(w.head(), Point::new(10, 9));
    }

    #[test]
    fn teleport_onto_body_is_a_bite() {
        let mut w = world_with(&[(5, 5), (4, 5), (3, 5)]);
        w.portal = Portal { entry: Point::new(6, 5), exit: Point::new(4, 5) };
        let events = step(&mut w, &mut rng());
        assert!(w.game_over);
        assert_eq!(body(&w), vec![(5, 5), (4, 5), (3, 5)]);
        assert!(events.contains(&GameEvent::Crashed {
            collision: Collision::Body,
            at: Point::new(4, 5),
        }));
    }

    // ── Commands ──

    #[test]
    fn reverse_turn_is_ignored() {
        let mut w = world_with(&[(5, 5), (4, 5)]);
        apply_command(&mut w, Command::Turn(Direction::Left));
        assert_eq!(w.direction, Direction::Right);
        assert_eq!(w.direction.delta(), (1, 0));
    }

    #[test]
    fn quick_double_turn_cannot_reverse() {
        let mut w = world_with(&[(5, 5), (4, 5)]);
        apply_command(&mut w, Command::Turn(Direction::Up));
        apply_command(&mut w, Command::Turn(Direction::Left));
        assert_eq!(w.direction, Direction::Up);

        step(&mut w, &mut rng());
        assert_eq!(w.head(), Point::new(5, 4));
        apply_command(&mut w, Command::Turn(Direction::Left));
        assert_eq!(w.direction, Direction::Left);
    }

    #[test]
    fn pause_and_quit_commands() {
        let mut w = world_with(&[(5, 5)]);
        apply_command(&mut w, Command::TogglePause);
        assert!(w.paused);
        apply_command(&mut w, Command::TogglePause);
        assert!(!w.paused);
        apply_command(&mut w, Command::Quit);
        assert!(w.game_over);
    }

    #[test]
    fn full_board_ends_game() {
        let bounds = Bounds::new(5, 4).unwrap(); // 3x2 interior
        let rules = RulesConfig { obstacle_batch: 0, points_per_level: 100, solid_border: false };
        let mut w = WorldState {
            bounds,
            rules,
            snake: VecDeque::from([Point::new(2, 1), Point::new(1, 1)]),
            direction: Direction::Right,
            heading: Direction::Right,
            food: Point::new(3, 1),
            obstacles: vec![Point::new(3, 2)],
            portal: Portal { entry: Point::new(1, 2), exit: Point::new(2, 2) },
            score: 0,
            high_score: 0,
            level: 0,
            tick: 0,
            paused: false,
            game_over: false,
        };

        let events = step(&mut w, &mut rng());
        assert_eq!(w.score, 1);
        assert!(w.game_over);
        assert_eq!(events.last(), Some(&GameEvent::BoardFull));
    }
}
