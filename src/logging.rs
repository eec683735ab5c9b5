use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;

use crate::error::LogError;

pub const LOG_FILE: &str = "tapspeed.log";

/// Installs a file-backed subscriber filtered by `RUST_LOG`.
///
/// The terminal belongs to the TUI, so nothing is written to stdout. Keep the
/// returned guard alive for the life of the program or buffered lines are lost.
pub fn init(log_dir: &Path) -> Result<WorkerGuard, LogError> {
    fs::create_dir_all(log_dir).map_err(|source| LogError::Dir {
        path: log_dir.to_path_buf(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(LogError::Subscriber)?;

    Ok(guard)
}
