//! Grid Directions and Positions
//!
//! Integer cell coordinates and the four movement directions.
//! Rotation helpers drive the firefly/butterfly state machines.

use serde::{Serialize, Deserialize};

/// Movement or facing direction of a cell.
///
/// `None` is the resting/no-input value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// No direction
    #[default]
    None = 0,
    /// Towards row 0
    Up = 1,
    /// Towards the last row
    Down = 2,
    /// Towards column 0
    Left = 3,
    /// Towards the last column
    Right = 4,
}

impl Direction {
    /// The four movement directions, in the order used for random picks.
    pub const CARDINAL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Column/row delta for one step.
    #[inline]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Rotate a quarter turn counter-clockwise.
    pub const fn rotate_left(self) -> Direction {
        match self {
            Direction::None => Direction::None,
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    /// Rotate a quarter turn clockwise.
    pub const fn rotate_right(self) -> Direction {
        match self {
            Direction::None => Direction::None,
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    /// True for left/right.
    #[inline]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Get direction from its `repr(u8)` code.
    pub fn from_code(code: u8) -> Option<Direction> {
        match code {
            0 => Some(Direction::None),
            1 => Some(Direction::Up),
            2 => Some(Direction::Down),
            3 => Some(Direction::Left),
            4 => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Cell coordinate: column `x`, row `y`.
///
/// Signed so that neighbours of edge cells can be expressed; the grid
/// treats anything outside its bounds as steel wall.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl Pos {
    /// Offsets of the 8-neighbourhood, row-major.
    pub const NEIGHBOURS_8: [(i32, i32); 8] = [
        (-1, -1), (0, -1), (1, -1),
        (-1, 0),           (1, 0),
        (-1, 1),  (0, 1),  (1, 1),
    ];

    /// Create a position.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Step one cell in `dir`.
    #[inline]
    pub const fn step(self, dir: Direction) -> Pos {
        let (dx, dy) = dir.delta();
        Pos::new(self.x + dx, self.y + dy)
    }

    /// Offset by an arbitrary delta.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Pos {
        Pos::new(self.x + dx, self.y + dy)
    }
}
