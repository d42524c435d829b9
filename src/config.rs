/// External configuration loader.
///
/// Reads `config.toml` from `--config`, else the executable's directory,
/// else the current directory.
/// Falls back to defaults if the file is missing, incomplete or malformed.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::domain::grid::GridSize;
use crate::sim::step::Rules;

const APP_DIR: &str = "ghost-snake";
const MIN_TICK_MS: u64 = 10;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub grid: GridSize,
    pub speed: SpeedConfig,
    pub rules: Rules,
    pub gamepad: GamepadConfig,
    /// Resolved scores file path.
    pub scores_file: PathBuf,
    pub default_user: String,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub leaderboard: Vec<String>,
    pub pause: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    grid: TomlGrid,
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlGrid {
    #[serde(default = "default_width")]
    width: i32,
    #[serde(default = "default_height")]
    height: i32,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug, Default)]
struct TomlRules {
    #[serde(default)]
    allow_tail_chase: bool,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_leaderboard")]
    leaderboard: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_scores_file")]
    scores_file: String,
    #[serde(default = "default_user")]
    default_user: String,
}

// ── Defaults ──

fn default_width() -> i32 { 30 }
fn default_height() -> i32 { 20 }
fn default_tick_rate() -> u64 { 90 }

fn default_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_leaderboard() -> Vec<String> { vec!["Y".into()] }
fn default_pause() -> Vec<String> { vec!["X".into()] }
fn default_scores_file() -> String { "highscores.dat".into() }
fn default_user() -> String { "demo".into() }

impl Default for TomlGrid {
    fn default() -> Self {
        TomlGrid { width: default_width(), height: default_height() }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed { tick_rate_ms: default_tick_rate() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
            leaderboard: default_leaderboard(),
            pause: default_pause(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            scores_file: default_scores_file(),
            default_user: default_user(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config. `explicit` (from `--config`) is the only place looked
    /// at when given; otherwise the candidate directories are searched.
    pub fn load(explicit: Option<&Path>) -> Self {
        let toml_cfg = match explicit {
            Some(path) => read_toml(path).unwrap_or_default(),
            None => candidate_dirs().iter()
                .map(|d| d.join("config.toml"))
                .find(|p| p.exists())
                .and_then(|p| read_toml(&p))
                .unwrap_or_default(),
        };
        Self::from_toml(toml_cfg, &data_dir())
    }

    /// Parse config text; relative paths resolve against `base`.
    pub fn parse(text: &str, base: &Path) -> Result<Self, toml::de::Error> {
        let cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::from_toml(cfg, base))
    }

    fn from_toml(cfg: TomlConfig, base: &Path) -> Self {
        let scores = PathBuf::from(&cfg.general.scores_file);
        let scores_file = if scores.is_absolute() { scores } else { base.join(scores) };

        GameConfig {
            grid: GridSize::new(cfg.grid.width, cfg.grid.height),
            speed: SpeedConfig {
                tick_rate_ms: cfg.speed.tick_rate_ms.max(MIN_TICK_MS),
            },
            rules: Rules {
                allow_tail_chase: cfg.rules.allow_tail_chase,
            },
            gamepad: GamepadConfig {
                confirm: cfg.gamepad.confirm,
                cancel: cfg.gamepad.cancel,
                leaderboard: cfg.gamepad.leaderboard,
                pause: cfg.gamepad.pause,
            },
            scores_file,
            default_user: cfg.general.default_user,
        }
    }
}

/// Read and parse one config file. Problems are reported and yield `None`
/// so the caller falls back to defaults.
fn read_toml(path: &Path) -> Option<TomlConfig> {
    match std::fs::read_to_string(path) {
        Ok(text) => match toml::from_str::<TomlConfig>(&text) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config parse error, using defaults");
                eprintln!("Warning: {} parse error: {e}", path.display());
                eprintln!("Using default settings.");
                None
            }
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config unreadable, using defaults");
            eprintln!("Warning: could not read {}: {e}", path.display());
            None
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Where relative data files (scores, log) live.
///
///   1. exe directory, if writable (portable installs)
///   2. `$HOME/.local/share/ghost-snake`
///   3. current directory
pub fn data_dir() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let marker = parent.join(".write_test_ghost_snake");
            if std::fs::write(&marker, "").is_ok() {
                let _ = std::fs::remove_file(&marker);
                return parent.to_path_buf();
            }
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share").join(APP_DIR);
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
