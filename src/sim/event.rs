/// Events emitted during a tick.
/// The presentation layer consumes these for HUD messages and sound.

use crate::domain::grid::Position;

/// Why a session ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EndCause {
    Wall,
    SelfCollision,
    /// The snake covers the whole board; no cell is left for food.
    BoardFull,
}

impl EndCause {
    pub fn describe(self) -> &'static str {
        match self {
            EndCause::Wall          => "Hit the wall",
            EndCause::SelfCollision => "Bit its own tail",
            EndCause::BoardFull     => "Board cleared!",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Moved { head: Position },
    FoodEaten { at: Position, score: u32 },
    FoodPlaced { at: Position },
    GameOver { cause: EndCause, score: u32, best: u32 },
    NewBest { score: u32, previous: Option<u32> },
    ScoreSaveFailed { reason: String },
}
