/// Keyboard input on its own thread.
///
/// The input thread blocks on `crossterm::event::read()`, maps keys to
/// `Command`s and sends them over a channel. It never touches the world;
/// the game loop drains the channel once per tick.
///
/// Every command is stamped with its arrival time here, so hold detection on
/// the loop side sees real key timing rather than the tick it was drained on.
/// Terminals without keyboard enhancement report a held key as a burst of
/// repeated presses, so "held" means "the same direction arrived again within
/// `HOLD_TIMEOUT`".

use std::io;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::Direction;
use crate::sim::step::Command;

/// Gap between repeats still counted as one continuous hold.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// A command plus the moment its key event arrived.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct KeyInput {
    pub command: Command,
    pub at: Instant,
}

pub fn command_for_key(key: &KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return Some(Command::Quit);
    }
    match key.code {
        KeyCode::Up => Some(Command::Turn(Direction::Up)),
        KeyCode::Down => Some(Command::Turn(Direction::Down)),
        KeyCode::Left => Some(Command::Turn(Direction::Left)),
        KeyCode::Right => Some(Command::Turn(Direction::Right)),
        KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char(' ') => Some(Command::TogglePause),
        _ => None,
    }
}

/// Pump events from `next_event` into `tx` until Quit is sent, the receiver
/// hangs up, or the event source fails.
pub fn forward_events<F>(mut next_event: F, tx: &Sender<KeyInput>) -> io::Result<()>
where
    F: FnMut() -> io::Result<Event>,
{
    loop {
        let cmd = match next_event()? {
            Event::Key(key) => command_for_key(&key),
            _ => None,
        };
        let Some(cmd) = cmd else { continue };

        if tx.send(KeyInput { command: cmd, at: Instant::now() }).is_err() {
            return Ok(());
        }
        if cmd == Command::Quit {
            return Ok(());
        }
    }
}

pub fn spawn_input_thread(tx: Sender<KeyInput>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("input".into())
        .spawn(move || {
            match forward_events(event::read, &tx) {
                Ok(()) => tracing::debug!("input thread finished"),
                Err(e) => tracing::warn!("input thread stopped: {e}"),
            }
        })
}

/// Tracks whether a direction key is being held down.
pub struct HoldTracker {
    last: Option<(Direction, Instant)>,
    held: bool,
}

impl HoldTracker {
    pub fn new() -> Self {
        HoldTracker { last: None, held: false }
    }

    pub fn record(&mut self, dir: Direction, at: Instant) {
        self.held = match self.last {
            Some((prev, t)) => prev == dir && at.saturating_duration_since(t) < HOLD_TIMEOUT,
            None => false,
        };
        self.last = Some((dir, at));
    }

    pub fn is_held(&self, now: Instant) -> bool {
        match self.last {
            Some((_, t)) => self.held && now.saturating_duration_since(t) < HOLD_TIMEOUT,
            None => false,
        }
    }
}
