/// Application context and the game launcher.
///
/// `AppContext` is built once in `main` from CLI + config and handed to
/// whatever needs paths or settings. Nothing in the crate keeps global
/// mutable state.

use std::path::PathBuf;

use tracing::info;

use crate::cli::Cli;
use crate::config::{data_dir, GameConfig};
use crate::error::LaunchError;
use crate::logging::DEFAULT_LOG_FILE;
use crate::sim::engine::GameEngine;
use crate::sim::scores::{FileScoreboard, MemoryScoreboard, Scoreboard};

#[derive(Clone, Debug)]
pub struct AppContext {
    pub config: GameConfig,
    pub username: String,
    /// `None` when scores are kept in memory only.
    pub scores_path: Option<PathBuf>,
    pub log_path: PathBuf,
    pub seed: Option<u64>,
}

impl AppContext {
    pub fn from_cli(cli: &Cli, config: GameConfig) -> Result<Self, LaunchError> {
        let raw = cli.user.clone().unwrap_or_else(|| config.default_user.clone());
        let username = validate_username(&raw)?;
        let scores_path = if cli.no_save {
            None
        } else {
            Some(cli.scores.clone().unwrap_or_else(|| config.scores_file.clone()))
        };
        Ok(AppContext {
            username,
            scores_path,
            log_path: log_path(cli),
            seed: cli.seed,
            config,
        })
    }
}

/// Log path from the CLI, or the default in the data directory.
/// Needed before config is read, so it does not depend on it.
pub fn log_path(cli: &Cli) -> PathBuf {
    cli.log_file.clone().unwrap_or_else(|| data_dir().join(DEFAULT_LOG_FILE))
}

/// Trimmed, non-empty, single-line.
pub fn validate_username(raw: &str) -> Result<String, LaunchError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(LaunchError::EmptyUsername);
    }
    if name.contains(['\n', '\r']) {
        return Err(LaunchError::MultilineUsername);
    }
    Ok(name.to_string())
}

// ── Launcher ──

/// Starts a game session for a user and hands back the running engine.
pub trait GameLauncher {
    fn launch(&self, username: &str) -> Result<GameEngine, LaunchError>;
}

/// Launcher backed by the scoreboard chosen in the context.
pub struct ScoreboardLauncher<'a> {
    ctx: &'a AppContext,
}

impl<'a> ScoreboardLauncher<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        ScoreboardLauncher { ctx }
    }

    fn scoreboard(&self) -> Box<dyn Scoreboard> {
        match &self.ctx.scores_path {
            Some(path) => Box::new(FileScoreboard::open(path.clone())),
            None => Box::new(MemoryScoreboard::new()),
        }
    }
}

impl GameLauncher for ScoreboardLauncher<'_> {
    fn launch(&self, username: &str) -> Result<GameEngine, LaunchError> {
        let username = validate_username(username)?;
        let cfg = &self.ctx.config;
        info!(
            user = %username,
            width = cfg.grid.width,
            height = cfg.grid.height,
            tail_chase = cfg.rules.allow_tail_chase,
            "launching session",
        );
        Ok(GameEngine::new(username, cfg.grid, cfg.rules, self.scoreboard(), self.ctx.seed))
    }
}
