/// Gamepad input using gilrs.
///
/// Button mapping comes from the `[gamepad]` section of config.toml.
/// Default mapping:
///   D-pad / Left Stick    →  Turn (on press)
///   Start / A             →  Retry
///   Select                →  Back / Quit
///   Y                     →  Leaderboard
///   X                     →  Pause

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::direction::Direction;
use super::input::Command;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER" => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Action-to-button mapping.
#[derive(Debug, PartialEq)]
struct ActionMap {
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
    leaderboard: Vec<Btn>,
    pause: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            confirm: vec![Btn::Start, Btn::A],
            cancel: vec![Btn::Select],
            leaderboard: vec![Btn::Y],
            pause: vec![Btn::X],
        }
    }
}

impl ActionMap {
    /// Unknown names are skipped; an action left with no buttons keeps
    /// its default.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String], fallback: Vec<Btn>) -> Vec<Btn> {
            let btns: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if btns.is_empty() { fallback } else { btns }
        }
        let d = ActionMap::default();
        ActionMap {
            confirm: parse_list(&cfg.confirm, d.confirm),
            cancel: parse_list(&cfg.cancel, d.cancel),
            leaderboard: parse_list(&cfg.leaderboard, d.leaderboard),
            pause: parse_list(&cfg.pause, d.pause),
        }
    }
}

/// Stick position → the direction it points past the deadzone, if any.
/// The larger axis wins; gilrs reports +y as up.
fn stick_direction(x: f32, y: f32) -> Option<Direction> {
    if x.abs() < STICK_DEADZONE && y.abs() < STICK_DEADZONE {
        return None;
    }
    Some(if x.abs() >= y.abs() {
        if x < 0.0 { Direction::Left } else { Direction::Right }
    } else if y > 0.0 {
        Direction::Up
    } else {
        Direction::Down
    })
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Buttons that went down since the last `update()`, indexed by `Btn`.
    pressed: [bool; BTN_COUNT],
    /// D-pad and stick turns this frame, in order.
    turns: Vec<Direction>,
    stick_x: f32,
    stick_y: f32,
    stick_dir: Option<Direction>,

    action_map: ActionMap,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let gilrs_opt = match Gilrs::new() {
            Ok(g) => {
                tracing::debug!(pads = g.gamepads().count(), "gamepad support ready");
                Some(g)
            }
            Err(e) => {
                tracing::debug!(error = %e, "gamepad support unavailable");
                None
            }
        };

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            pressed: [false; BTN_COUNT],
            turns: Vec::with_capacity(4),
            stick_x: 0.0,
            stick_y: 0.0,
            stick_dir: None,
            action_map: ActionMap::from_config(cfg),
        }
    }

    pub fn update(&mut self) {
        self.pressed = [false; BTN_COUNT];
        self.turns.clear();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => self.press(btn),
                EventType::AxisChanged(axis, value, _) => {
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                    self.update_stick();
                }
                EventType::Connected => tracing::info!(id = ?event.id, "gamepad connected"),
                EventType::Disconnected => {
                    tracing::info!(id = ?event.id, "gamepad disconnected");
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                    self.stick_dir = None;
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, btn: Button) {
        let turn = match btn {
            Button::DPadUp => Some(Direction::Up),
            Button::DPadDown => Some(Direction::Down),
            Button::DPadLeft => Some(Direction::Left),
            Button::DPadRight => Some(Direction::Right),
            _ => None,
        };
        if let Some(dir) = turn {
            self.turns.push(dir);
        } else if let Some(b) = Btn::from_gilrs(btn) {
            self.pressed[b as usize] = true;
        }
    }

    /// A turn fires when the stick enters a new direction, not while held.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn update_stick(&mut self) {
        let dir = stick_direction(self.stick_x, self.stick_y);
        if dir != self.stick_dir {
            if let Some(d) = dir {
                self.turns.push(d);
            }
            self.stick_dir = dir;
        }
    }

    fn any_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.pressed[b as usize])
    }

    /// Commands from this frame: turns first, then buttons.
    pub fn commands(&self) -> Vec<Command> {
        let mut out: Vec<Command> = self.turns.iter().map(|&d| Command::Turn(d)).collect();
        let map = &self.action_map;
        if self.any_pressed(&map.confirm) { out.push(Command::Confirm); }
        if self.any_pressed(&map.leaderboard) { out.push(Command::Leaderboard); }
        if self.any_pressed(&map.pause) { out.push(Command::Pause); }
        if self.any_pressed(&map.cancel) { out.push(Command::Cancel); }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(confirm: &[&str], pause: &[&str]) -> GamepadConfig {
        GamepadConfig {
            confirm: confirm.iter().map(|s| s.to_string()).collect(),
            cancel: vec!["Back".into()],
            leaderboard: vec!["north".into()],
            pause: pause.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn button_names_are_case_insensitive_aliases() {
        let map = ActionMap::from_config(&config(&["start", "SOUTH"], &["RB"]));
        assert_eq!(map.confirm, vec![Btn::Start, Btn::A]);
        assert_eq!(map.cancel, vec![Btn::Select]);
        assert_eq!(map.leaderboard, vec![Btn::Y]);
        assert_eq!(map.pause, vec![Btn::R1]);
    }

    #[test]
    fn unknown_names_fall_back_to_defaults() {
        let map = ActionMap::from_config(&config(&["Turbo"], &[]));
        assert_eq!(map.confirm, ActionMap::default().confirm);
        assert_eq!(map.pause, vec![Btn::X]);
    }

    #[test]
    fn stick_direction_uses_dominant_axis() {
        assert_eq!(stick_direction(0.1, 0.1), None);
        assert_eq!(stick_direction(-0.9, 0.3), Some(Direction::Left));
        assert_eq!(stick_direction(0.5, 0.0), Some(Direction::Right));
        assert_eq!(stick_direction(0.2, 0.8), Some(Direction::Up));
        assert_eq!(stick_direction(0.0, -0.6), Some(Direction::Down));
    }

    #[test]
    fn stick_turn_fires_once_per_direction() {
        let mut gp = GamepadState::new(&config(&["Start"], &["X"]));
        gp.stick_x = 0.9;
        gp.update_stick();
        gp.stick_x = 1.0;
        gp.update_stick();
        assert_eq!(gp.commands(), vec![Command::Turn(Direction::Right)]);

        gp.stick_x = 0.0;
        gp.update_stick();
        gp.stick_y = -0.9;
        gp.update_stick();
        assert_eq!(gp.commands().last(), Some(&Command::Turn(Direction::Down)));
    }

    #[test]
    fn pressed_buttons_map_to_commands() {
        let mut gp = GamepadState::new(&config(&["Start"], &["X"]));
        gp.pressed[Btn::Start as usize] = true;
        gp.pressed[Btn::Select as usize] = true;
        assert_eq!(gp.commands(), vec![Command::Confirm, Command::Cancel]);
    }
}
