/// Error types. None of these are fatal to the game loop.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A raw vector that is not one of the four unit directions.
#[derive(Error, Clone, Copy, PartialEq, Eq, Debug)]
#[error("({dx}, {dy}) is not a unit direction")]
pub struct InvalidDirection {
    pub dx: i32,
    pub dy: i32,
}

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("could not read scores from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write scores to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("username {0:?} cannot be stored")]
    InvalidName(String),
}

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("username must be a single line")]
    MultilineUsername,
}
