/// Heading of the snake. Only the four unit vectors are representable;
/// raw vectors from outside go through `TryFrom<(i32, i32)>`.

use crate::error::InvalidDirection;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Unit vector, screen coordinates (y grows downward).
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up    => (0, -1),
            Direction::Down  => (0, 1),
            Direction::Left  => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up    => Direction::Down,
            Direction::Down  => Direction::Up,
            Direction::Left  => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Right
    }
}

impl TryFrom<(i32, i32)> for Direction {
    type Error = InvalidDirection;

    fn try_from((dx, dy): (i32, i32)) -> Result<Self, Self::Error> {
        match (dx, dy) {
            (0, -1) => Ok(Direction::Up),
            (0, 1)  => Ok(Direction::Down),
            (-1, 0) => Ok(Direction::Left),
            (1, 0)  => Ok(Direction::Right),
            _ => Err(InvalidDirection { dx, dy }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_vectors_convert() {
        for dir in Direction::ALL {
            assert_eq!(Direction::try_from(dir.delta()), Ok(dir));
        }
    }

    #[test]
    fn non_unit_vectors_are_rejected() {
        for v in [(0, 0), (1, 1), (-1, 1), (2, 0), (0, -3)] {
            assert_eq!(Direction::try_from(v), Err(InvalidDirection { dx: v.0, dy: v.1 }));
        }
    }

    #[test]
    fn opposites_pair_up() {
        assert!(Direction::Left.is_opposite(Direction::Right));
        assert!(Direction::Up.is_opposite(Direction::Down));
        assert!(!Direction::Up.is_opposite(Direction::Left));
        assert!(!Direction::Up.is_opposite(Direction::Up));
    }

    #[test]
    fn starts_heading_right() {
        assert_eq!(Direction::default().delta(), (1, 0));
    }
}
