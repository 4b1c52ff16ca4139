/// Diagnostic logging to a file.
///
/// The terminal belongs to the renderer, so tracing output goes to
/// `logging.file` through a non-blocking writer. `RUST_LOG` overrides the
/// configured level. The returned guard flushes the writer on drop and must
/// outlive the game loop.

use std::fs::{self, OpenOptions};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

pub fn init_logging(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    if !logging.enabled {
        return Ok(None);
    }

    if let Some(dir) = logging.file.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory at {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logging.file)
        .with_context(|| format!("opening log file at {}", logging.file.display()))?;

    let (writer, guard) = non_blocking::NonBlockingBuilder::default()
        .lossy(false)
        .finish(file);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer)
        .finish();

    // Already set when embedded in tests; keep the existing one.
    let _ = tracing::subscriber::set_global_default(subscriber);

    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_logging_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = LoggingConfig {
            enabled: false,
            level: "debug".into(),
            file: dir.path().join("game.log"),
        };
        assert!(init_logging(&cfg).unwrap().is_none());
        assert!(!cfg.file.exists());
    }

    #[test]
    fn enabled_logging_opens_file_in_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = LoggingConfig {
            enabled: true,
            level: "not a level ===".into(),
            file: dir.path().join("logs").join("game.log"),
        };
        let guard = init_logging(&cfg).unwrap();
        assert!(guard.is_some());
        assert!(cfg.file.exists());
    }
}
