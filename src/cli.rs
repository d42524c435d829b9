/// Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "ghost-snake", version, about = "Terminal snake with per-user best scores")]
pub struct Cli {
    /// Player name; overrides `general.default_user` from config.toml
    #[arg(short, long)]
    pub user: Option<String>,

    /// Path to config.toml
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Scores file; overrides `general.scores_file`
    #[arg(long, value_name = "PATH")]
    pub scores: Option<PathBuf>,

    /// Seed for food placement
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log file (default: ghost-snake.log in the data directory)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Keep best scores in memory only
    #[arg(long)]
    pub no_save: bool,
}
