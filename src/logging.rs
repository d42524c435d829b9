/// Log setup.
///
/// The terminal is in raw mode on the alternate screen while playing, so
/// `tracing` output goes to a file instead of stderr. Filter comes from
/// `RUST_LOG`, default `ghost_snake=info`.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_LOG_FILE: &str = "ghost-snake.log";
const DEFAULT_FILTER: &str = "ghost_snake=info";

/// Install the global subscriber writing to `path` (appending).
pub fn init(path: &Path) -> io::Result<()> {
    let file = open_log(path)?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

fn open_log(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_and_parent_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("g.log");
        open_log(&path).unwrap();
        assert!(path.exists());
    }
}
