/// Events emitted during a simulation step.
/// The game loop consumes these for logging.

use crate::domain::entity::Point;
use crate::domain::rules::Collision;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Moved { head: Point },
    Teleported { from: Point, to: Point },
    FoodEaten { at: Point, score: u32 },
    HighScoreBeaten { score: u32 },
    LevelUp { level: u32, obstacles_added: usize },
    Crashed { collision: Collision, at: Point },
    BoardFull,
}
