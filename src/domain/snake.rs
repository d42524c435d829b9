/// Snake body: head-first ordered cells plus an occupancy grid.
///
/// ## Invariants
///
///   - `body` is never empty and holds no duplicate cells.
///   - `occupied[i] == true` ↔ `grid.position(i)` is in `body`.
///
/// All mutations go through `push_head()` / `pop_tail()`, which keep the
/// two views in lockstep, so `contains()` is O(1) regardless of length.

use std::collections::VecDeque;

use super::grid::{GridSize, Position};

#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<Position>,
    occupied: Vec<bool>,
    grid: GridSize,
}

impl Snake {
    /// A one-cell snake at `head`.
    pub fn new(grid: GridSize, head: Position) -> Self {
        let mut snake = Snake {
            body: VecDeque::with_capacity(16),
            occupied: vec![false; grid.cell_count()],
            grid,
        };
        snake.push_head(head);
        snake
    }

    /// Build a snake from head-first cells. Out-of-bounds and repeated
    /// cells are dropped. Returns `None` if nothing is left.
    pub fn from_cells<I>(grid: GridSize, cells: I) -> Option<Self>
    where
        I: IntoIterator<Item = Position>,
    {
        let mut snake = Snake {
            body: VecDeque::with_capacity(16),
            occupied: vec![false; grid.cell_count()],
            grid,
        };
        for p in cells {
            if grid.contains(p) && !snake.contains(p) {
                snake.body.push_back(p);
                snake.mark(p, true);
            }
        }
        if snake.body.is_empty() { None } else { Some(snake) }
    }

    #[inline]
    pub fn head(&self) -> Position {
        // Non-empty by construction; pop_tail never removes the last cell.
        self.body[0]
    }

    #[inline]
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    #[inline]
    pub fn contains(&self, p: Position) -> bool {
        self.grid.index(p).map_or(false, |i| self.occupied[i])
    }

    pub fn to_vec(&self) -> Vec<Position> {
        self.body.iter().copied().collect()
    }

    /// Does the body cover every cell of the board?
    pub fn fills_grid(&self) -> bool {
        self.body.len() >= self.grid.cell_count()
    }

    /// Prepend a new head. Caller guarantees `p` is in bounds and free
    /// (or is the tail about to be popped on the same tick).
    pub fn push_head(&mut self, p: Position) {
        self.body.push_front(p);
        self.mark(p, true);
    }

    /// Remove the tail cell. The last remaining cell is never removed.
    pub fn pop_tail(&mut self) -> Option<Position> {
        if self.body.len() <= 1 {
            return None;
        }
        let tail = self.body.pop_back()?;
        // A head that moved onto the old tail shares the cell; keep it marked.
        if self.body.front() != Some(&tail) {
            self.mark(tail, false);
        }
        Some(tail)
    }

    fn mark(&mut self, p: Position, value: bool) {
        if let Some(i) = self.grid.index(p) {
            self.occupied[i] = value;
        }
    }
}
