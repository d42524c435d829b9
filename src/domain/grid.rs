/// Grid geometry: board size and cell positions.
///
/// Positions are signed so that a candidate head one step past the
/// border is still representable; `GridSize::contains` is the single
/// bounds check used by the simulation.

use super::direction::Direction;

/// Smallest board edge accepted from config.
pub const MIN_EDGE: i32 = 2;
/// Largest board edge accepted from config. Keeps `width * height` and the
/// occupancy grid small enough for any config value.
pub const MAX_EDGE: i32 = 200;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// The neighbouring cell in `dir`. May lie outside the board.
    #[inline]
    pub fn step(self, dir: Direction) -> Position {
        let (dx, dy) = dir.delta();
        Position { x: self.x + dx, y: self.y + dy }
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Position { x, y }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GridSize {
    pub width: i32,
    pub height: i32,
}

impl GridSize {
    /// Board size with both edges clamped to `MIN_EDGE..=MAX_EDGE`.
    pub fn new(width: i32, height: i32) -> Self {
        GridSize {
            width: width.clamp(MIN_EDGE, MAX_EDGE),
            height: height.clamp(MIN_EDGE, MAX_EDGE),
        }
    }

    #[inline]
    pub fn contains(&self, p: Position) -> bool {
        p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }

    pub fn cell_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Row-major index of an in-bounds position.
    #[inline]
    pub fn index(&self, p: Position) -> Option<usize> {
        if self.contains(p) {
            Some(p.y as usize * self.width as usize + p.x as usize)
        } else {
            None
        }
    }

    /// Inverse of `index`.
    pub fn position(&self, idx: usize) -> Position {
        let w = self.width as usize;
        Position::new((idx % w) as i32, (idx / w) as i32)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        GridSize::new(30, 20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_board_is_thirty_by_twenty() {
        let g = GridSize::default();
        assert_eq!((g.width, g.height), (30, 20));
        assert_eq!(g.center(), Position::new(15, 10));
        assert_eq!(g.cell_count(), 600);
    }

    #[test]
    fn edges_are_clamped() {
        let g = GridSize::new(0, -4);
        assert_eq!((g.width, g.height), (MIN_EDGE, MIN_EDGE));
        let g = GridSize::new(i32::MAX, 65_536);
        assert_eq!((g.width, g.height), (MAX_EDGE, MAX_EDGE));
        assert_eq!(g.cell_count(), (MAX_EDGE * MAX_EDGE) as usize);
    }

    #[test]
    fn contains_rejects_every_border_overrun() {
        let g = GridSize::new(30, 20);
        assert!(g.contains(Position::new(0, 0)));
        assert!(g.contains(Position::new(29, 19)));
        assert!(!g.contains(Position::new(-1, 5)));
        assert!(!g.contains(Position::new(30, 5)));
        assert!(!g.contains(Position::new(5, -1)));
        assert!(!g.contains(Position::new(5, 20)));
    }

    #[test]
    fn index_round_trips_through_position() {
        let g = GridSize::new(7, 3);
        let p = Position::new(4, 2);
        let idx = g.index(p).unwrap();
        assert_eq!(idx, 18);
        assert_eq!(g.position(idx), p);
        assert_eq!(g.index(Position::new(7, 0)), None);
    }

    #[test]
    fn step_follows_direction_vector() {
        let p = Position::new(5, 5);
        assert_eq!(p.step(Direction::Left), Position::new(4, 5));
        assert_eq!(p.step(Direction::Up), Position::new(5, 4));
    }
}
