//! File-backed logging.
//!
//! Logs go to `LOG_DIR/hello-starter.log.YYYY-MM-DD` (daily rotation) and a
//! compact copy to stderr. `RUST_LOG` wins over `LOG_LEVEL` when set:
//!
//! RUST_LOG=info,hello_starter=debug,tower_http=debug cargo run

use std::path::Path;
use std::{fs, io, panic, process};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogConfig;

const LOG_FILE_PREFIX: &str = "hello-starter.log";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir { path: String, source: io::Error },

    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// whole process.
pub fn init(config: &LogConfig) -> Result<WorkerGuard, LoggingError> {
    ensure_log_dir(&config.dir)?;

    let file_appender = tracing_appender::rolling::daily(&config.dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter(&config.level)?)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init()?;

    tracing::info!(dir = %config.dir.display(), "logging initialized");

    Ok(guard)
}

pub fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr may be detached, so always route panics through tracing as well
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

fn env_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(level)?),
    }
}

fn ensure_log_dir(dir: &Path) -> Result<(), LoggingError> {
    fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
        path: dir.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_nested_log_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("var").join("log");

        ensure_log_dir(&dir).unwrap();
        assert!(dir.is_dir());

        // idempotent
        ensure_log_dir(&dir).unwrap();
    }

    #[test]
    fn unparseable_level_is_an_error() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert!(env_filter("debug").is_ok());
        assert!(matches!(
            env_filter("hello_starter=loud"),
            Err(LoggingError::Filter(_))
        ));
    }

    #[test]
    fn log_dir_under_a_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("not-a-dir");
        fs::write(&file, b"x").unwrap();

        let err = ensure_log_dir(&file.join("logs")).unwrap_err();
        assert!(matches!(err, LoggingError::CreateDir { .. }));
    }
}
