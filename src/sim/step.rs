/// The step function: advances a session by one tick.
///
/// Processing order:
///   1. Commit the pending turn
///   2. Compute the next head
///   3. Collision check (wall, body); on a hit nothing else moves
///   4. Prepend the head
///   5. Food: grow + score + new food, or drop the tail
///
/// Game-over bookkeeping (scoreboard) is not done here; `step` only reports
/// the cause and the engine finishes the session.

use rand::Rng;

use crate::domain::grid::{GridSize, Position};
use crate::domain::snake::Snake;
use super::event::{EndCause, GameEvent};
use super::session::Session;

/// Rule switches that change collision semantics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rules {
    /// Moving into the cell the tail leaves this tick is legal.
    pub allow_tail_chase: bool,
}

/// What a single step did.
#[derive(Clone, Debug, Default)]
pub struct StepOutcome {
    pub events: Vec<GameEvent>,
    /// Set when the session must end on this tick.
    pub ended: Option<EndCause>,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step<R: Rng + ?Sized>(s: &mut Session, rules: Rules, rng: &mut R) -> StepOutcome {
    let mut out = StepOutcome::default();
    if s.is_over() { return out; }

    let dir = s.heading();
    let next = s.snake.head().step(dir);

    if let Some(cause) = collision(s, next, rules) {
        // Leave snake, food, score and direction exactly as they were.
        out.ended = Some(cause);
        return out;
    }

    s.direction = dir;
    s.pending = None;
    s.ticks += 1;
    s.snake.push_head(next);
    out.events.push(GameEvent::Moved { head: next });

    if s.food == Some(next) {
        s.score += 1;
        out.events.push(GameEvent::FoodEaten { at: next, score: s.score });
        s.food = place_food(&s.snake, s.grid, rng);
        match s.food {
            Some(at) => out.events.push(GameEvent::FoodPlaced { at }),
            None => out.ended = Some(EndCause::BoardFull),
        }
    } else {
        s.snake.pop_tail();
    }

    out
}

// ══════════════════════════════════════════════════════════════
// Collision
// ══════════════════════════════════════════════════════════════

fn collision(s: &Session, next: Position, rules: Rules) -> Option<EndCause> {
    if !s.grid.contains(next) {
        return Some(EndCause::Wall);
    }
    if !s.snake.contains(next) {
        return None;
    }
    // The tail cell is vacated this tick unless the snake grows.
    let tail_vacates = s.snake.len() > 1
        && next == s.snake.tail()
        && s.food != Some(next);
    if rules.allow_tail_chase && tail_vacates {
        None
    } else {
        Some(EndCause::SelfCollision)
    }
}

// ══════════════════════════════════════════════════════════════
// Food placement
// ══════════════════════════════════════════════════════════════

/// Uniform random cell not covered by the snake, or `None` if the board
/// is full.
///
/// Rejection sampling first; after `4 × cells` misses (a nearly full
/// board) fall back to picking uniformly from the free cells directly,
/// which has the same distribution but bounded cost.
pub fn place_food<R: Rng + ?Sized>(snake: &Snake, grid: GridSize, rng: &mut R) -> Option<Position> {
    if snake.fills_grid() { return None; }

    let attempts = grid.cell_count() * 4;
    for _ in 0..attempts {
        let p = Position::new(rng.gen_range(0..grid.width), rng.gen_range(0..grid.height));
        if !snake.contains(p) {
            return Some(p);
        }
    }

    let free: Vec<Position> = (0..grid.cell_count())
        .map(|i| grid.position(i))
        .filter(|p| !snake.contains(*p))
        .collect();
    if free.is_empty() {
        None
    } else {
        Some(free[rng.gen_range(0..free.len())])
    }
}
