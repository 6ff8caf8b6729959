use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "STREAMFLIX_LOG";
const LOG_FILE: &str = "streamflix.log";

/// Initialize structured logging to `<state dir>/streamflix.log`.
///
/// The terminal belongs to the TUI, so nothing is written to stdout/stderr.
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init_logging() -> std::io::Result<(WorkerGuard, PathBuf)> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let appender = tracing_appender::rolling::never(&log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info,streamflix=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let log_path = log_dir.join(LOG_FILE);
    tracing::info!("streamflix logging initialized at {}", log_path.display());
    Ok((guard, log_path))
}

fn log_dir() -> PathBuf {
    crate::config::project_dirs()
        .map(|dirs| dirs.state_dir().unwrap_or_else(|| dirs.cache_dir()).to_path_buf())
        .unwrap_or_else(std::env::temp_dir)
}
