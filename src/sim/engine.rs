/// GameEngine: owns one session for one user and a scoreboard.
///
/// The engine is the only thing the front end talks to:
///   - commands: `reset()`, `turn()`, `tick()`
///   - queries:  `snake()`, `food()`, `score()`, `is_game_over()`, `best_score()`, ...
///
/// `tick()` returns the events of that tick; the caller renders and plays
/// sounds from them. Scoreboard failures never escape `tick()`.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::domain::direction::Direction;
use crate::domain::grid::{GridSize, Position};
use crate::error::InvalidDirection;
use super::event::{EndCause, GameEvent};
use super::scores::{leaderboard, Ranked, Scoreboard};
use super::session::{RunState, Session};
use super::step::{self, Rules};

pub struct GameEngine {
    username: String,
    session: Session,
    rules: Rules,
    rng: StdRng,
    scoreboard: Box<dyn Scoreboard>,
}

impl GameEngine {
    /// New engine with a freshly reset session.
    pub fn new(
        username: impl Into<String>,
        grid: GridSize,
        rules: Rules,
        scoreboard: Box<dyn Scoreboard>,
        seed: Option<u64>,
    ) -> Self {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let session = Session::new(grid, &mut rng);
        GameEngine {
            username: username.into(),
            session,
            rules,
            rng,
            scoreboard,
        }
    }

    // ── Commands ──

    /// Replace the session with a fresh one.
    pub fn reset(&mut self) {
        self.session = Session::new(self.session.grid, &mut self.rng);
        debug!(user = %self.username, "session reset");
    }

    /// Request a heading for the next tick. Reversals and turns after game
    /// over are dropped silently.
    pub fn turn(&mut self, dir: Direction) {
        self.session.queue_turn(dir);
    }

    /// `turn()` for a raw vector. Anything but a unit vector is rejected
    /// without touching the session.
    pub fn turn_vector(&mut self, dx: i32, dy: i32) -> Result<(), InvalidDirection> {
        let dir = Direction::try_from((dx, dy))?;
        self.turn(dir);
        Ok(())
    }

    /// Advance one step. No-op once the session is over.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let outcome = step::step(&mut self.session, self.rules, &mut self.rng);
        let mut events = outcome.events;
        if let Some(cause) = outcome.ended {
            self.on_game_over(cause, &mut events);
        }
        events
    }

    fn on_game_over(&mut self, cause: EndCause, events: &mut Vec<GameEvent>) {
        self.session.finish(cause);
        let score = self.session.score;
        let previous = self.scoreboard.best(&self.username);
        let improved = previous.map_or(true, |b| score > b);

        if let Err(e) = self.scoreboard.record(&self.username, score) {
            warn!(user = %self.username, score, error = %e, "best score not saved");
            events.push(GameEvent::ScoreSaveFailed { reason: e.to_string() });
        }
        if improved {
            events.push(GameEvent::NewBest { score, previous });
        }

        let best = self.best_score().max(score);
        info!(user = %self.username, score, best, ?cause, ticks = self.session.ticks, "game over");
        events.push(GameEvent::GameOver { cause, score, best });
    }

    // ── Queries ──

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn grid(&self) -> GridSize {
        self.session.grid
    }

    /// Snake cells, head first.
    pub fn snake(&self) -> Vec<Position> {
        self.session.snake.to_vec()
    }

    pub fn snake_len(&self) -> usize {
        self.session.snake.len()
    }

    pub fn snake_head(&self) -> Position {
        self.session.snake.head()
    }

    pub fn is_snake_at(&self, p: Position) -> bool {
        self.session.snake.contains(p)
    }

    pub fn food(&self) -> Option<Position> {
        self.session.food
    }

    pub fn score(&self) -> u32 {
        self.session.score
    }

    pub fn direction(&self) -> Direction {
        self.session.direction
    }

    pub fn is_game_over(&self) -> bool {
        self.session.state == RunState::GameOver
    }

    pub fn end_cause(&self) -> Option<EndCause> {
        self.session.end_cause
    }

    /// Best score for the active user (0 if none recorded).
    pub fn best_score(&self) -> u32 {
        self.scoreboard.best(&self.username).unwrap_or(0)
    }

    pub fn leaderboard(&self) -> Vec<Ranked> {
        leaderboard(self.scoreboard.entries())
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::snake::Snake;
    use crate::sim::scores::{FileScoreboard, MemoryScoreboard};

    fn engine_for(user: &str, board: Box<dyn Scoreboard>) -> GameEngine {
        GameEngine::new(user, GridSize::new(30, 20), Rules::default(), board, Some(9))
    }

    fn engine() -> GameEngine {
        engine_for("tester", Box::new(MemoryScoreboard::new()))
    }

    fn place(e: &mut GameEngine, cells: &[(i32, i32)], dir: Direction, food: (i32, i32)) {
        let s = e.session_mut();
        s.snake = Snake::from_cells(s.grid, cells.iter().map(|&p| Position::from(p))).unwrap();
        s.direction = dir;
        s.pending = None;
        s.food = Some(Position::from(food));
    }

    /// Eat `n` food items straight ahead, then run into the top wall.
    fn play_to_score(e: &mut GameEngine, n: u32) {
        e.reset();
        for i in 0..n {
            let head = e.snake_head();
            e.session_mut().food = Some(Position::new(head.x + 1, head.y));
            e.tick();
            assert_eq!(e.score(), i + 1);
        }
        // Keep the run up to the top wall free of food.
        e.session_mut().food = Some(Position::new(0, 19));
        e.turn(Direction::Up);
        while !e.is_game_over() {
            e.tick();
        }
    }

    #[test]
    fn self_collision_scenario() {
        let mut e = engine();
        place(&mut e, &[(5, 5), (4, 5), (3, 5)], Direction::Left, (20, 10));
        let events = e.tick();
        assert!(e.is_game_over());
        assert_eq!(e.snake(), vec![Position::new(5, 5), Position::new(4, 5), Position::new(3, 5)]);
        assert_eq!(e.end_cause(), Some(EndCause::SelfCollision));
        assert!(matches!(events.last(), Some(GameEvent::GameOver { cause: EndCause::SelfCollision, .. })));
    }

    #[test]
    fn eat_scenario_after_reset() {
        let mut e = engine();
        e.reset();
        assert_eq!(e.snake(), vec![Position::new(15, 10)]);
        assert_eq!(e.direction(), Direction::Right);
        e.session_mut().food = Some(Position::new(16, 10));

        e.tick();
        // The tail stays on the eating tick: the snake grows by one cell.
        assert_eq!(e.snake(), vec![Position::new(16, 10), Position::new(15, 10)]);
        assert_eq!(e.snake_len(), 2);
        assert_eq!(e.score(), 1);
        let food = e.food().unwrap();
        assert!(!e.is_snake_at(food));
    }

    #[test]
    fn length_is_invariant_without_food() {
        let mut e = engine();
        place(&mut e, &[(10, 10), (9, 10), (8, 10)], Direction::Right, (0, 0));
        let turns = [Direction::Down, Direction::Right, Direction::Up, Direction::Right, Direction::Down];
        for dir in turns {
            e.turn(dir);
            e.tick();
            e.tick();
            assert!(!e.is_game_over());
            assert_eq!(e.snake_len(), 3);
        }
    }

    #[test]
    fn reverse_turn_keeps_heading() {
        let mut e = engine();
        place(&mut e, &[(10, 10), (9, 10)], Direction::Right, (0, 0));
        e.turn(Direction::Left);
        let before = e.snake_head();
        e.tick();
        let after = e.snake_head();
        assert_eq!((after.x - before.x, after.y - before.y), (1, 0));
    }

    #[test]
    fn quick_double_turn_cannot_reverse() {
        let mut e = engine();
        place(&mut e, &[(10, 10), (9, 10), (8, 10)], Direction::Right, (0, 0));
        e.turn(Direction::Up);
        e.turn(Direction::Left);
        e.tick();
        assert!(!e.is_game_over());
        assert_eq!(e.snake_head(), Position::new(10, 9));
    }

    #[test]
    fn invalid_vector_is_rejected_without_change() {
        let mut e = engine();
        place(&mut e, &[(10, 10)], Direction::Right, (0, 0));
        assert_eq!(e.turn_vector(1, 1), Err(InvalidDirection { dx: 1, dy: 1 }));
        assert_eq!(e.session_mut().pending, None);
        assert!(e.turn_vector(0, 1).is_ok());
        e.tick();
        assert_eq!(e.snake_head(), Position::new(10, 11));
    }

    #[test]
    fn ticks_after_game_over_are_noops() {
        let mut e = engine();
        place(&mut e, &[(0, 0)], Direction::Left, (5, 5));
        e.tick();
        assert!(e.is_game_over());
        assert!(e.tick().is_empty());
        e.turn(Direction::Down);
        assert!(e.tick().is_empty());
        assert_eq!(e.snake(), vec![Position::new(0, 0)]);
    }

    #[test]
    fn reset_returns_to_running() {
        let mut e = engine();
        place(&mut e, &[(0, 0)], Direction::Left, (5, 5));
        e.tick();
        e.reset();
        assert!(!e.is_game_over());
        assert_eq!(e.score(), 0);
        assert_eq!(e.snake(), vec![Position::new(15, 10)]);
    }

    #[test]
    fn best_score_is_monotonic_per_user() {
        let mut e = engine_for("alice", Box::new(MemoryScoreboard::with_entries([("alice", 3)])));
        play_to_score(&mut e, 5);
        assert_eq!(e.best_score(), 5);
        play_to_score(&mut e, 2);
        assert_eq!(e.best_score(), 5);
    }

    #[test]
    fn game_over_event_reports_score_and_best() {
        let mut e = engine_for("alice", Box::new(MemoryScoreboard::with_entries([("alice", 3)])));
        e.reset();
        e.session_mut().score = 5;
        place(&mut e, &[(0, 0)], Direction::Left, (5, 5));
        let events = e.tick();
        assert!(events.contains(&GameEvent::NewBest { score: 5, previous: Some(3) }));
        assert!(events.contains(&GameEvent::GameOver { cause: EndCause::Wall, score: 5, best: 5 }));
    }

    #[test]
    fn first_game_creates_entry() {
        let mut e = engine_for("newbie", Box::new(MemoryScoreboard::new()));
        place(&mut e, &[(0, 0)], Direction::Left, (5, 5));
        let events = e.tick();
        assert!(events.contains(&GameEvent::NewBest { score: 0, previous: None }));
        assert_eq!(e.leaderboard().len(), 1);
    }

    #[test]
    fn persistence_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let board = FileScoreboard::open(blocker.join("scores.dat"));
        let mut e = engine_for("alice", Box::new(board));

        e.session_mut().score = 4;
        place(&mut e, &[(29, 0)], Direction::Right, (5, 5));
        let events = e.tick();

        assert!(e.is_game_over());
        assert_eq!(e.best_score(), 4);
        assert!(events.iter().any(|ev| matches!(ev, GameEvent::ScoreSaveFailed { .. })));
        assert!(events.contains(&GameEvent::GameOver { cause: EndCause::Wall, score: 4, best: 4 }));
    }

    #[test]
    fn scores_survive_a_new_engine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.dat");

        let mut e = engine_for("alice", Box::new(FileScoreboard::open(&path)));
        play_to_score(&mut e, 2);

        let e2 = engine_for("bob", Box::new(FileScoreboard::open(&path)));
        let board = e2.leaderboard();
        assert_eq!(board[0].name, "alice");
        assert_eq!(board[0].score, 2);
        assert_eq!(e2.best_score(), 0);
    }

    #[test]
    fn tail_chase_rule_reaches_step() {
        let rules = Rules { allow_tail_chase: true };
        let mut e = GameEngine::new("t", GridSize::new(30, 20), rules, Box::new(MemoryScoreboard::new()), Some(1));
        place(&mut e, &[(5, 5), (5, 6), (6, 6), (6, 5)], Direction::Right, (20, 10));
        e.tick();
        assert!(!e.is_game_over());
        assert_eq!(e.snake_head(), Position::new(6, 5));
    }
}
