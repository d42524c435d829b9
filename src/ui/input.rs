/// Keyboard input.
///
/// Drains crossterm events once per frame and turns key presses into
/// `Command`s, in arrival order. Every press of a different key counts, so
/// fast zig-zags are kept. Auto-repeat is dropped: `Repeat` events always,
/// and on terminals that report repeats as plain presses, a press of the
/// same key as the previous one within `REPEAT_WINDOW`.

use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::direction::Direction;

/// Same-key presses closer together than this are treated as auto-repeat.
const REPEAT_WINDOW: Duration = Duration::from_millis(160);

/// What a key (or gamepad button) asks the front end to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    /// Retry after game over.
    Confirm,
    Leaderboard,
    Pause,
    /// Esc / Select: leave the leaderboard, otherwise quit.
    Cancel,
    Quit,
}

/// Key → command. Turn keys: arrows, WASD, HJKL.
pub fn command_for(code: KeyCode) -> Option<Command> {
    let cmd = match code {
        KeyCode::Up => Command::Turn(Direction::Up),
        KeyCode::Down => Command::Turn(Direction::Down),
        KeyCode::Left => Command::Turn(Direction::Left),
        KeyCode::Right => Command::Turn(Direction::Right),
        KeyCode::Enter => Command::Confirm,
        KeyCode::Esc => Command::Cancel,
        KeyCode::F(1) => Command::Pause,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' | 'k' => Command::Turn(Direction::Up),
            's' | 'j' => Command::Turn(Direction::Down),
            'a' | 'h' => Command::Turn(Direction::Left),
            'd' => Command::Turn(Direction::Right),
            ' ' | 'r' => Command::Confirm,
            'l' => Command::Leaderboard,
            'p' => Command::Pause,
            'q' => Command::Quit,
            _ => return None,
        },
        _ => return None,
    };
    Some(cmd)
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
}

pub struct InputState {
    /// Most recent press and when it (or its auto-repeat) was last seen.
    last_press: Option<(KeyCode, Instant)>,
    /// Commands from this frame, in order.
    commands: Vec<Command>,
    ctrl_c: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_press: None,
            commands: Vec::with_capacity(8),
            ctrl_c: false,
        }
    }

    /// Read every pending terminal event without blocking.
    pub fn drain_events(&mut self) {
        self.commands.clear();
        self.ctrl_c = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.handle_key(key, Instant::now());
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if is_ctrl_c(&key) {
            self.ctrl_c = true;
            return;
        }
        match key.kind {
            KeyEventKind::Repeat => {}
            KeyEventKind::Release => {
                if self.last_press.map_or(false, |(code, _)| code == key.code) {
                    self.last_press = None;
                }
            }
            KeyEventKind::Press => {
                let repeat = matches!(self.last_press,
                    Some((code, t)) if code == key.code && now.duration_since(t) < REPEAT_WINDOW);
                self.last_press = Some((key.code, now));
                if !repeat {
                    if let Some(cmd) = command_for(key.code) {
                        self.commands.push(cmd);
                    }
                }
            }
        }
    }

    /// Commands from this frame, oldest first.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.ctrl_c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn turn_keys_cover_arrows_wasd_and_hjkl() {
        for (keys, dir) in [
            ([KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('K')], Direction::Up),
            ([KeyCode::Down, KeyCode::Char('S'), KeyCode::Char('j')], Direction::Down),
            ([KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('h')], Direction::Left),
            ([KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')], Direction::Right),
        ] {
            for k in keys {
                assert_eq!(command_for(k), Some(Command::Turn(dir)), "{k:?}");
            }
        }
    }

    #[test]
    fn meta_keys() {
        assert_eq!(command_for(KeyCode::Enter), Some(Command::Confirm));
        assert_eq!(command_for(KeyCode::Char(' ')), Some(Command::Confirm));
        assert_eq!(command_for(KeyCode::Char('R')), Some(Command::Confirm));
        assert_eq!(command_for(KeyCode::Char('l')), Some(Command::Leaderboard));
        assert_eq!(command_for(KeyCode::F(1)), Some(Command::Pause));
        assert_eq!(command_for(KeyCode::Char('p')), Some(Command::Pause));
        assert_eq!(command_for(KeyCode::Esc), Some(Command::Cancel));
        assert_eq!(command_for(KeyCode::Char('q')), Some(Command::Quit));
        assert_eq!(command_for(KeyCode::Char('z')), None);
        assert_eq!(command_for(KeyCode::Tab), None);
    }

    #[test]
    fn zigzag_keeps_every_turn() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        input.handle_key(press(KeyCode::Up), t0);
        input.handle_key(press(KeyCode::Right), t0 + Duration::from_millis(50));
        input.handle_key(press(KeyCode::Up), t0 + Duration::from_millis(100));
        assert_eq!(
            input.commands(),
            &[
                Command::Turn(Direction::Up),
                Command::Turn(Direction::Right),
                Command::Turn(Direction::Up),
            ],
        );
    }

    #[test]
    fn repeat_events_are_ignored() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        input.handle_key(press(KeyCode::Left), t0);
        let mut repeat = press(KeyCode::Left);
        repeat.kind = KeyEventKind::Repeat;
        input.handle_key(repeat, t0 + Duration::from_millis(500));
        assert_eq!(input.commands(), &[Command::Turn(Direction::Left)]);
    }

    #[test]
    fn slow_presses_of_the_same_key_both_count() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        input.handle_key(press(KeyCode::Char('p')), t0);
        input.handle_key(press(KeyCode::Char('p')), t0 + Duration::from_millis(400));
        assert_eq!(input.commands(), &[Command::Pause, Command::Pause]);
    }

    #[test]
    fn repeat_of_held_key_is_ignored() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        input.handle_key(press(KeyCode::Up), t0);
        input.handle_key(press(KeyCode::Up), t0 + Duration::from_millis(30));
        assert_eq!(input.commands(), &[Command::Turn(Direction::Up)]);
    }

    #[test]
    fn different_keys_in_one_frame_keep_order() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        input.handle_key(press(KeyCode::Up), t0);
        input.handle_key(press(KeyCode::Left), t0);
        assert_eq!(
            input.commands(),
            &[Command::Turn(Direction::Up), Command::Turn(Direction::Left)],
        );
    }

    #[test]
    fn release_rearms_key() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        input.handle_key(press(KeyCode::Up), t0);
        let mut release = press(KeyCode::Up);
        release.kind = KeyEventKind::Release;
        input.handle_key(release, t0);
        input.handle_key(press(KeyCode::Up), t0);
        assert_eq!(input.commands().len(), 2);
    }

    #[test]
    fn ctrl_c_is_flagged_not_mapped() {
        let mut input = InputState::new();
        input.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), Instant::now());
        assert!(input.ctrl_c_pressed());
        assert!(input.commands().is_empty());
    }
}
