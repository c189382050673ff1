pub mod event;
pub mod highscore;
pub mod placement;
pub mod step;
pub mod world;
