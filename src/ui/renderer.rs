/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Board coordinates map 1:1 onto terminal cells. The renderer only reads
/// `WorldState`.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::Point;
use crate::sim::world::WorldState;

// ── Glyphs ──

const HEAD: char = '@';
const BODY: char = 'o';
const FOOD: char = '*';
const OBSTACLE: char = '?';
const PORTAL: char = 'O';

const GAME_OVER: &str = "GAME OVER";

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::Reset, bg: Color::Reset };

    /// Sentinel used to invalidate the back buffer so every position is diff'd.
    const INVALID: Cell = Cell { ch: '\0', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color) -> Self {
        Cell { ch, fg, bg: Color::Reset }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Board point; negative coordinates are clipped.
    fn set_point(&mut self, p: Point, ch: char, fg: Color) {
        if p.x >= 0 && p.y >= 0 {
            self.set(p.x as usize, p.y as usize, Cell::new(ch, fg));
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg));
        }
    }

    /// Write a string horizontally centred on row `y` of a `width`-wide area.
    fn put_centered(&mut self, width: usize, y: usize, s: &str, fg: Color) {
        let len = s.chars().count();
        let x = (width / 2).saturating_sub(len / 2);
        self.put_str(x, y, s, fg);
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size()?;
        self.resize(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Terminal size captured at `init`, in cells.
    pub fn size(&self) -> (usize, usize) {
        (self.term_w, self.term_h)
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        self.begin_frame()?;
        compose_game(&mut self.front, world);
        self.end_frame()
    }

    pub fn render_game_over(&mut self, world: &WorldState) -> io::Result<()> {
        self.begin_frame()?;
        compose_game_over(&mut self.front, world);
        self.end_frame()
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    fn begin_frame(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((self.term_w as u16, self.term_h as u16));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, ResetColor, Clear(ClearType::All))?;
        }
        self.front.clear();
        Ok(())
    }

    fn end_frame(&mut self) -> io::Result<()> {
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::Reset;
        let mut last_bg = Color::Reset;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer, ResetColor)?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

// ── Compose: build front buffer content ──

fn compose_game(buf: &mut FrameBuffer, w: &WorldState) {
    compose_border(buf, w.bounds.width() as usize, w.bounds.height() as usize);

    // HUD first: entities under the text must stay visible.
    buf.put_str(1, 1, &format!("Score: {}", w.score), Color::Yellow);
    buf.put_str(1, 2, &format!("High Score: {}", w.high_score), Color::Cyan);
    buf.put_str(1, 3, &format!("Level: {}", w.level), Color::White);

    for o in &w.obstacles {
        buf.set_point(*o, OBSTACLE, Color::Magenta);
    }
    buf.set_point(w.portal.entry, PORTAL, Color::Blue);
    buf.set_point(w.portal.exit, PORTAL, Color::Blue);
    buf.set_point(w.food, FOOD, Color::Red);

    // Tail to head so the head glyph always wins.
    for p in w.snake.iter().skip(1).rev() {
        buf.set_point(*p, BODY, Color::Green);
    }
    buf.set_point(w.head(), HEAD, Color::Green);

    if w.paused {
        buf.put_centered(w.bounds.width() as usize, 0, " PAUSED ", Color::Yellow);
    }
}

fn compose_border(buf: &mut FrameBuffer, width: usize, height: usize) {
    if width == 0 || height == 0 { return; }
    let (right, bottom) = (width - 1, height - 1);
    let c = |ch| Cell::new(ch, Color::White);

    for x in 0..width {
        buf.set(x, 0, c('─'));
        buf.set(x, bottom, c('─'));
    }
    for y in 0..height {
        buf.set(0, y, c('│'));
        buf.set(right, y, c('│'));
    }
    buf.set(0, 0, c('┌'));
    buf.set(right, 0, c('┐'));
    buf.set(0, bottom, c('└'));
    buf.set(right, bottom, c('┘'));
}

fn compose_game_over(buf: &mut FrameBuffer, w: &WorldState) {
    let width = w.bounds.width() as usize;
    let mid = w.bounds.height() as usize / 2;
    buf.put_centered(width, mid, GAME_OVER, Color::Red);
    buf.put_centered(width, mid + 1, &format!("Score: {}", w.score), Color::White);
}
