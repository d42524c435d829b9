/// Front-end state: which screen is up, pause, transient messages, and the
/// result flags of the last game. Commands from keyboard and gamepad are
/// applied here so the main loop only moves data around.

use crate::sim::engine::GameEngine;
use crate::sim::event::GameEvent;
use super::input::Command;

/// Ticks a transient message stays on screen.
const MESSAGE_TICKS: u32 = 40;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    /// Board, with the game-over overlay once the session ends.
    Playing,
    Leaderboard,
}

/// What the loop should do after a command.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Flow {
    Continue,
    /// A new session started; restart the tick timer.
    Restarted,
    Quit,
}

#[derive(Clone, Debug)]
pub struct UiState {
    pub screen: Screen,
    pub paused: bool,
    pub message: String,
    message_timer: u32,
    /// The session that just ended set a new personal best.
    pub new_best: bool,
    pub save_error: Option<String>,
    /// Frame-independent counter for blinking.
    pub anim_tick: u32,
}

impl UiState {
    pub fn new() -> Self {
        UiState {
            screen: Screen::Playing,
            paused: false,
            message: String::new(),
            message_timer: 0,
            new_best: false,
            save_error: None,
            anim_tick: 0,
        }
    }

    /// `timer == 0` keeps the message until it is replaced or cleared.
    pub fn set_message(&mut self, msg: &str, timer: u32) {
        self.message = msg.to_string();
        self.message_timer = timer;
    }

    fn clear_message(&mut self) {
        self.message.clear();
        self.message_timer = 0;
    }

    /// Advance animation and expire the message. Called once per tick
    /// interval, paused or not.
    pub fn tick(&mut self) {
        self.anim_tick = self.anim_tick.wrapping_add(1);
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }

    /// Whether the engine should advance this interval.
    pub fn should_tick(&self, engine: &GameEngine) -> bool {
        self.screen == Screen::Playing && !self.paused && !engine.is_game_over()
    }

    pub fn apply_events(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::NewBest { score, .. } => {
                    self.new_best = true;
                    self.set_message(&format!("New best: {score}"), MESSAGE_TICKS);
                }
                GameEvent::ScoreSaveFailed { reason } => {
                    self.save_error = Some(reason.clone());
                    self.set_message("Best score could not be saved", MESSAGE_TICKS);
                }
                GameEvent::GameOver { .. } => {
                    self.paused = false;
                }
                _ => {}
            }
        }
    }

    pub fn handle_command(&mut self, engine: &mut GameEngine, cmd: Command) -> Flow {
        match (self.screen, cmd) {
            (_, Command::Quit) => Flow::Quit,

            (Screen::Leaderboard, Command::Cancel | Command::Leaderboard) => {
                self.screen = Screen::Playing;
                Flow::Continue
            }
            (Screen::Leaderboard, Command::Confirm) => self.restart(engine),
            (Screen::Leaderboard, _) => Flow::Continue,

            (Screen::Playing, Command::Cancel) => Flow::Quit,
            (Screen::Playing, Command::Turn(dir)) => {
                if !self.paused {
                    engine.turn(dir);
                }
                Flow::Continue
            }
            (Screen::Playing, Command::Pause) => {
                if !engine.is_game_over() {
                    self.paused = !self.paused;
                    if self.paused {
                        self.set_message("PAUSED  [P] Resume", 0);
                    } else {
                        self.clear_message();
                    }
                }
                Flow::Continue
            }
            (Screen::Playing, Command::Confirm) if engine.is_game_over() => self.restart(engine),
            (Screen::Playing, Command::Leaderboard) if engine.is_game_over() => {
                self.screen = Screen::Leaderboard;
                Flow::Continue
            }
            (Screen::Playing, _) => Flow::Continue,
        }
    }

    fn restart(&mut self, engine: &mut GameEngine) -> Flow {
        engine.reset();
        self.screen = Screen::Playing;
        self.paused = false;
        self.new_best = false;
        self.save_error = None;
        self.clear_message();
        Flow::Restarted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::direction::Direction;
    use crate::domain::grid::GridSize;
    use crate::sim::scores::MemoryScoreboard;
    use crate::sim::step::Rules;

    fn engine() -> GameEngine {
        GameEngine::new("ui", GridSize::new(10, 10), Rules::default(), Box::new(MemoryScoreboard::new()), Some(1))
    }

    fn crash(ui: &mut UiState, e: &mut GameEngine) {
        e.turn(Direction::Up);
        while !e.is_game_over() {
            let events = e.tick();
            ui.apply_events(&events);
        }
    }

    #[test]
    fn pause_blocks_ticks_and_turns() {
        let mut ui = UiState::new();
        let mut e = engine();
        assert!(ui.should_tick(&e));
        ui.handle_command(&mut e, Command::Pause);
        assert!(ui.paused);
        assert!(!ui.should_tick(&e));
        ui.handle_command(&mut e, Command::Turn(Direction::Up));
        ui.handle_command(&mut e, Command::Pause);
        assert!(!ui.paused);
        assert!(ui.message.is_empty());
        e.tick();
        assert_eq!(e.direction(), Direction::Right);
    }

    #[test]
    fn first_game_over_is_a_new_best() {
        let mut ui = UiState::new();
        let mut e = engine();
        crash(&mut ui, &mut e);
        assert!(ui.new_best);
        assert!(!ui.should_tick(&e));
        assert!(ui.save_error.is_none());
    }

    #[test]
    fn confirm_only_restarts_after_game_over() {
        let mut ui = UiState::new();
        let mut e = engine();
        assert_eq!(ui.handle_command(&mut e, Command::Confirm), Flow::Continue);
        crash(&mut ui, &mut e);
        assert_eq!(ui.handle_command(&mut e, Command::Confirm), Flow::Restarted);
        assert!(!e.is_game_over());
        assert!(!ui.new_best);
    }

    #[test]
    fn leaderboard_round_trip() {
        let mut ui = UiState::new();
        let mut e = engine();
        ui.handle_command(&mut e, Command::Leaderboard);
        assert_eq!(ui.screen, Screen::Playing);

        crash(&mut ui, &mut e);
        ui.handle_command(&mut e, Command::Leaderboard);
        assert_eq!(ui.screen, Screen::Leaderboard);
        assert_eq!(ui.handle_command(&mut e, Command::Cancel), Flow::Continue);
        assert_eq!(ui.screen, Screen::Playing);
        assert!(e.is_game_over());
    }

    #[test]
    fn cancel_and_quit() {
        let mut ui = UiState::new();
        let mut e = engine();
        assert_eq!(ui.handle_command(&mut e, Command::Cancel), Flow::Quit);
        ui.screen = Screen::Leaderboard;
        assert_eq!(ui.handle_command(&mut e, Command::Quit), Flow::Quit);
    }

    #[test]
    fn save_failure_is_kept_for_the_overlay() {
        let mut ui = UiState::new();
        ui.apply_events(&[GameEvent::ScoreSaveFailed { reason: "disk full".into() }]);
        assert_eq!(ui.save_error.as_deref(), Some("disk full"));
        assert!(!ui.message.is_empty());
    }

    #[test]
    fn messages_expire() {
        let mut ui = UiState::new();
        ui.set_message("hi", 2);
        ui.tick();
        assert_eq!(ui.message, "hi");
        ui.tick();
        assert!(ui.message.is_empty());
    }
}
