//! Debug logging support for searchedit
//!
//! When debug mode is enabled via config or `--debug`, diagnostic events are
//! written to ~/.searchedit/searchedit.log. This is separate from the
//! per-session change log, which is always written.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry};

const LOG_FILE_NAME: &str = "searchedit.log";

/// Environment variable overriding the default `searchedit=info` filter
pub const LOG_ENV_VAR: &str = "SEARCHEDIT_LOG";

/// Keeps the background log writer alive; drop it at exit to flush
pub struct LogHandle {
    pub path: PathBuf,
    _guard: WorkerGuard,
}

/// Initialize the debug logging system
///
/// If debug_enabled is true, sets up file logging in `log_dir`.
/// Returns None if logging is not enabled or the log file cannot be opened.
pub fn init_debug_logging(debug_enabled: bool, log_dir: &Path) -> Result<Option<LogHandle>> {
    if !debug_enabled {
        return Ok(None);
    }

    let log_path = log_dir.join(LOG_FILE_NAME);

    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    // Open the file first so a read-only location degrades to no logging
    let opened = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()));

    match opened {
        Ok(_) => {
            let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| EnvFilter::new("searchedit=info"));

            let subscriber = registry()
                .with(
                    fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false),
                )
                .with(filter);

            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

            Ok(Some(LogHandle {
                path: log_path,
                _guard: guard,
            }))
        }
        Err(e) => {
            // Logging must never stop an editing session
            eprintln!("Warning: Could not create log file: {:#}", e);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_debug_logging_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let result = init_debug_logging(false, temp_dir.path());
        assert!(result.is_ok());
        assert!(result.unwrap().is_none(), "Should return None when debug is disabled");
        assert!(!temp_dir.path().join(LOG_FILE_NAME).exists());
    }
}
