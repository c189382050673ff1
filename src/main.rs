/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use config::{GameConfig, SpeedConfig};
use domain::entity::Bounds;
use domain::rules;
use sim::event::GameEvent;
use sim::highscore::HighScoreStore;
use sim::step::{self, Command};
use sim::world::WorldState;
use ui::input::{spawn_input_thread, HoldTracker, KeyInput};
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const GAME_OVER_HOLD: Duration = Duration::from_secs(2);
const APP_DIR: &str = "snake-portal";

fn main() {
    let log_guard = init_logging();

    let config = GameConfig::load();
    tracing::info!(?config, "configuration loaded");

    let store = HighScoreStore::resolve(&config.highscore_file);
    tracing::info!("high score file: {}", store.path().display());

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        let _ = renderer.cleanup();
        tracing::error!("terminal init failed: {e}");
        eprintln!("Terminal init failed: {e}");
        drop(log_guard);
        std::process::exit(1);
    }

    let result = run(&mut renderer, &config, &store);

    if let Err(e) = renderer.cleanup() {
        tracing::warn!("terminal cleanup failed: {e}");
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(world) => {
            println!("Final Score: {}  (High Score: {})", world.score, world.high_score);
        }
        Err(e) => {
            tracing::error!("game error: {e}");
            eprintln!("Game error: {e}");
            drop(log_guard);
            std::process::exit(1);
        }
    }
}

/// Build the board, play until game over, persist the high score and show
/// the game-over screen.
fn run(
    renderer: &mut Renderer,
    config: &GameConfig,
    store: &HighScoreStore,
) -> Result<WorldState, Box<dyn std::error::Error>> {
    let (tw, th) = renderer.size();
    let bounds = Bounds::new(tw as i32, th as i32)?;

    let seed = config.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    tracing::info!(width = tw, height = th, seed, "starting game");

    let mut world = WorldState::new(bounds, &config.rules, store.load(), &mut rng)?;

    let (tx, rx) = mpsc::channel();
    let _input = spawn_input_thread(tx)?;

    let played = game_loop(&mut world, renderer, &rx, &mut rng, &config.speed);

    let saved = store.record(world.score, world.high_score);
    tracing::info!(score = world.score, level = world.level, high_score = saved, "game over");
    played?;

    renderer.render_game_over(&world)?;
    std::thread::sleep(GAME_OVER_HOLD);

    Ok(world)
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    commands: &Receiver<KeyInput>,
    rng: &mut StdRng,
    speed: &SpeedConfig,
) -> std::io::Result<()> {
    let mut hold = HoldTracker::new();
    let mut last_tick = Instant::now();

    renderer.render(world)?;

    while !world.game_over {
        let interval = rules::tick_interval(speed, world.level, hold.is_held(Instant::now()));

        if last_tick.elapsed() >= interval {
            last_tick = Instant::now();

            drain_commands(world, commands, &mut hold);
            if world.game_over { break; }

            let events = step::step(world, rng);
            log_events(&events);

            renderer.render(world)?;
        }

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Apply every command queued since the last tick, in arrival order.
/// Only turns the snake can take feed hold detection.
fn drain_commands(world: &mut WorldState, commands: &Receiver<KeyInput>, hold: &mut HoldTracker) {
    for KeyInput { command: cmd, at } in commands.try_iter() {
        match cmd {
            Command::Turn(dir) if rules::accepts_turn(world.heading, dir) => hold.record(dir, at),
            Command::Turn(_) => {}
            Command::TogglePause => tracing::debug!(paused = !world.paused, "pause toggled"),
            Command::Quit => tracing::info!("quit requested"),
        }
        step::apply_command(world, cmd);
    }
}

fn log_events(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::Moved { .. } => {}
            GameEvent::Teleported { from, to } => tracing::debug!(?from, ?to, "teleported"),
            GameEvent::FoodEaten { at, score } => tracing::debug!(?at, score, "food eaten"),
            GameEvent::HighScoreBeaten { score } => tracing::info!(score, "new high score"),
            GameEvent::LevelUp { level, obstacles_added } => {
                tracing::info!(level, obstacles_added, "level up")
            }
            GameEvent::Crashed { collision, at } => tracing::info!(?collision, ?at, "crashed"),
            GameEvent::BoardFull => tracing::info!("no room left for food"),
        }
    }
}

// ── Logging ──

/// Log to a file: the terminal belongs to the game.
/// Returns `None` (logging disabled) if no cache directory is usable.
fn init_logging() -> Option<WorkerGuard> {
    let log_dir = log_directory()?;
    std::fs::create_dir_all(&log_dir).ok()?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "snake-portal.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    // `info` unless RUST_LOG says otherwise.
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .ok()?;

    tracing::info!("log file: {}/snake-portal.log", log_dir.display());
    Some(guard)
}

fn log_directory() -> Option<PathBuf> {
    if let Some(xdg_cache) = std::env::var_os("XDG_CACHE_HOME") {
        return Some(PathBuf::from(xdg_cache).join(APP_DIR));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache").join(APP_DIR))
}
