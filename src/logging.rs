//! File logging for the TUI. The terminal belongs to ratatui, so everything goes
//! to a daily-rolling file in the platform data directory.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV: &str = "TUBEDASH_LOG";
const DEFAULT_LOG_FILTER: &str = "info";

/// Directory the log files are written to.
pub fn log_dir() -> Result<PathBuf> {
  let dirs = ProjectDirs::from("", "", "tubedash").context("no home directory for log files")?;
  Ok(dirs.data_local_dir().join("logs"))
}

/// Install the global subscriber. Keep the guard alive until exit so buffered
/// lines get flushed.
pub fn init_logging() -> Result<WorkerGuard> {
  let dir = log_dir()?;
  std::fs::create_dir_all(&dir).with_context(|| format!("creating log directory {}", dir.display()))?;

  let file_appender = tracing_appender::rolling::daily(&dir, "tubedash.log");
  let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

  tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().with_writer(non_blocking).with_ansi(false).with_target(false))
    .try_init()
    .context("installing tracing subscriber")?;

  Ok(guard)
}
