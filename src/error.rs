use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::session::Difficulty;

/// Why a text provider could not hand out samples
#[derive(Debug, Error)]
pub enum TextSourceError {
    #[error("failed to read corpus {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid corpus json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("embedded corpus {0} not found")]
    MissingFile(&'static str),

    #[error("corpus has no samples for {0}")]
    Empty(Difficulty),
}

/// Failure reading or writing the personal best
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("personal best store i/o: {0}")]
    Io(#[from] io::Error),

    #[error("personal best store json: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Why the log file could not be set up
#[derive(Debug, Error)]
pub enum LogError {
    #[error("cannot create log directory {path}: {source}")]
    Dir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot install log subscriber: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}
