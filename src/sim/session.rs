/// Session: the complete state of one playthrough.
///
/// ## Lifecycle
///
///   - `Session::new()` builds the starting position: one-cell snake at the
///     board centre heading right, score 0, `Running`, food on a random
///     free cell.
///   - Reset replaces the whole value with a fresh `Session::new()`.
///   - `RunState::GameOver` is terminal until that replacement.
///
/// ## Direction
///
///   - `direction` is the heading used by the last completed move.
///   - `pending` is the turn requested since then, committed on the next
///     tick. Reversal is checked against `direction`, never `pending`, so
///     two quick turns between ticks cannot fold the snake onto itself.

use rand::Rng;

use crate::domain::direction::Direction;
use crate::domain::grid::{GridSize, Position};
use crate::domain::snake::Snake;
use super::event::EndCause;
use super::step::place_food;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RunState {
    Running,
    GameOver,
}

#[derive(Clone, Debug)]
pub struct Session {
    pub grid: GridSize,
    pub snake: Snake,
    /// `None` only once the snake has filled the board.
    pub food: Option<Position>,
    pub direction: Direction,
    pub pending: Option<Direction>,
    pub score: u32,
    pub state: RunState,
    pub end_cause: Option<EndCause>,
    /// Completed moves this session.
    pub ticks: u64,
}

impl Session {
    pub fn new<R: Rng + ?Sized>(grid: GridSize, rng: &mut R) -> Self {
        let snake = Snake::new(grid, grid.center());
        let food = place_food(&snake, grid, rng);
        Session {
            grid,
            snake,
            food,
            direction: Direction::Right,
            pending: None,
            score: 0,
            state: RunState::Running,
            end_cause: None,
            ticks: 0,
        }
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.state == RunState::GameOver
    }

    /// Queue a turn for the next tick. Returns false if it was dropped
    /// (reversal, or the session already ended).
    pub fn queue_turn(&mut self, dir: Direction) -> bool {
        if self.is_over() || dir.is_opposite(self.direction) {
            return false;
        }
        self.pending = Some(dir);
        true
    }

    /// The heading the next tick will use.
    pub fn heading(&self) -> Direction {
        self.pending.unwrap_or(self.direction)
    }

    pub fn finish(&mut self, cause: EndCause) {
        self.state = RunState::GameOver;
        self.end_cause = Some(cause);
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn fresh_session_matches_lifecycle() {
        let mut rng = StdRng::seed_from_u64(7);
        let s = Session::new(GridSize::new(30, 20), &mut rng);
        assert_eq!(s.snake.to_vec(), vec![Position::new(15, 10)]);
        assert_eq!(s.direction, Direction::Right);
        assert_eq!(s.score, 0);
        assert_eq!(s.state, RunState::Running);
        let food = s.food.unwrap();
        assert!(s.grid.contains(food));
        assert!(!s.snake.contains(food));
    }

    #[test]
    fn reversal_is_checked_against_committed_direction() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut s = Session::new(GridSize::default(), &mut rng);
        assert!(s.queue_turn(Direction::Up));
        // Left is the reverse of the committed Right, even though Up is pending.
        assert!(!s.queue_turn(Direction::Left));
        assert_eq!(s.heading(), Direction::Up);
    }

    #[test]
    fn finished_session_ignores_turns() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut s = Session::new(GridSize::default(), &mut rng);
        s.finish(EndCause::Wall);
        assert!(!s.queue_turn(Direction::Up));
        assert_eq!(s.pending, None);
        assert_eq!(s.end_cause, Some(EndCause::Wall));
    }
}
