/// Entities: Point, Direction, Portal, Bounds.
/// All are small `Copy` value types compared by equality.

use crate::error::{GameError, Result};

/// Integer grid coordinate. Signed so a candidate head can step past the edge.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// The neighbouring cell one step in `dir`.
    pub fn step(self, dir: Direction) -> Point {
        let (dx, dy) = dir.delta();
        Point { x: self.x + dx, y: self.y + dy }
    }
}

/// Movement direction: one of the four unit vectors.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit vector `(dx, dy)`; y grows downwards like terminal rows.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

/// A bidirectional teleport pair.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Portal {
    pub entry: Point,
    pub exit: Point,
}

impl Portal {
    /// Single hop: entry maps to exit, exit maps to entry, anything else is unchanged.
    pub fn teleport(&self, p: Point) -> Point {
        if p == self.entry {
            self.exit
        } else if p == self.exit {
            self.entry
        } else {
            p
        }
    }

    #[cfg(test)]
    pub fn contains(&self, p: Point) -> bool {
        p == self.entry || p == self.exit
    }
}

/// Board dimensions, fixed for the lifetime of a game.
///
/// The outermost ring (row/col 0 and max) is where the border is drawn;
/// everything strictly inside it is the interior used for placement.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Bounds {
    width: i32,
    height: i32,
}

impl Bounds {
    pub const MIN_SIDE: i32 = 3;

    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width < Self::MIN_SIDE || height < Self::MIN_SIDE {
            return Err(GameError::BoardTooSmall { width, height });
        }
        Ok(Bounds { width, height })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2, self.height / 2)
    }

    /// Inside `[0, width) x [0, height)`.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    /// Strictly inside the border ring.
    pub fn contains_interior(&self, p: Point) -> bool {
        p.x >= 1 && p.y >= 1 && p.x < self.width - 1 && p.y < self.height - 1
    }

    pub fn interior_area(&self) -> usize {
        ((self.width - 2) * (self.height - 2)) as usize
    }

    /// Interior cells in row-major order.
    pub fn interior_cells(&self) -> impl Iterator<Item = Point> {
        let (w, h) = (self.width, self.height);
        (1..h - 1).flat_map(move |y| (1..w - 1).map(move |x| Point::new(x, y)))
    }
}
