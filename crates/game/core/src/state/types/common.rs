use std::fmt;

use arrayvec::ArrayVec;

/// Unique identifier for any entity tracked in the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    /// Reserved identifier for the controllable player character.
    pub const PLAYER: Self = Self(0);

    /// Reserved identifier for system-level work (End-of-Round sweep, spawns).
    pub const SYSTEM: Self = Self(u32::MAX);

    /// Returns true if this entity represents a system actor.
    #[inline]
    pub const fn is_system(self) -> bool {
        self.0 == Self::SYSTEM.0
    }

    /// Returns true if this entity represents the player.
    #[inline]
    pub const fn is_player(self) -> bool {
        self.0 == Self::PLAYER.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of an item instance. Allocated from the same counter as actors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(pub u32);

/// Identifier of a trait instance, unique across the whole world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraitId(pub u32);

/// Dungeon level index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelId(pub u16);

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance: diagonal steps cost the same as orthogonal ones.
    pub fn distance(self, other: Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    pub fn is_adjacent(self, other: Position) -> bool {
        self != other && self.distance(other) <= 1
    }

    pub fn step(self, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        Position::new(self.x + dx, self.y + dy)
    }

    /// Unit step (each axis in -1..=1) from `self` toward `other`.
    pub fn heading(self, other: Position) -> (i32, i32) {
        ((other.x - self.x).signum(), (other.y - self.y).signum())
    }

    /// Bresenham line from `self` to `to`, both ends included.
    pub fn line_to(self, to: Position) -> Vec<Position> {
        let dx = (to.x - self.x).abs();
        let dy = -(to.y - self.y).abs();
        let sx = if self.x < to.x { 1 } else { -1 };
        let sy = if self.y < to.y { 1 } else { -1 };
        let mut error = dx + dy;
        let (mut x, mut y) = (self.x, self.y);
        let mut points = Vec::with_capacity((dx - dy) as usize + 1);
        loop {
            points.push(Position::new(x, y));
            if x == to.x && y == to.y {
                break;
            }
            let doubled = 2 * error;
            if doubled >= dy {
                error += dy;
                x += sx;
            }
            if doubled <= dx {
                error += dx;
                y += sy;
            }
        }
        points
    }

    /// The tile just past `through` on the line from `self` through it.
    ///
    /// The line is drawn to twice the offset, which passes exactly through
    /// `through` at the halfway step.
    pub fn beyond(self, through: Position) -> Option<Position> {
        let steps = self.distance(through) as usize;
        if steps == 0 {
            return None;
        }
        let far = Position::new(2 * through.x - self.x, 2 * through.y - self.y);
        self.line_to(far).get(steps + 1).copied()
    }

    /// The eight surrounding tiles, clockwise from north.
    pub fn neighbours(self) -> ArrayVec<Position, 8> {
        Direction::ALL.iter().map(|&d| self.step(d)).collect()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Eight-way compass direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Grid delta; y grows southward.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        Direction::ALL
            .iter()
            .copied()
            .find(|d| d.delta() == (dx.signum(), dy.signum()) && (dx, dy) != (0, 0))
    }
}
