//! Logging bootstrap.
//!
//! Installs a `tracing` subscriber with a console layer and, when a log
//! directory is configured, a non-blocking file layer. `RUST_LOG` overrides
//! the configured level.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Default log level when neither config nor `RUST_LOG` set one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log file name prefix.
pub const DEFAULT_LOG_PREFIX: &str = "eventures";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The configured level is not a valid filter directive.
    #[error("invalid log level {0:?}")]
    InvalidLevel(String),

    /// The log directory could not be created.
    #[error("failed to create log directory {path}: {source}")]
    CreateDirectory { path: PathBuf, source: io::Error },

    /// A global subscriber is already installed.
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `eventures=debug`.
    pub level: String,
    /// Directory for the log file. Console only when `None`.
    pub directory: Option<PathBuf>,
    /// Log file name prefix; the file is `{prefix}.log`.
    pub file_prefix: String,
    /// Colour console output.
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
            file_prefix: DEFAULT_LOG_PREFIX.to_string(),
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Set the level directive.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Also write logs into `directory`.
    pub fn with_directory(mut self, directory: PathBuf) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Path of the log file, if file logging is enabled.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.directory
            .as_ref()
            .map(|dir| dir.join(format!("{}.log", self.file_prefix)))
    }
}

/// Keeps the file writer alive; flushes pending lines when dropped.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let filter = build_filter(&config.level, std::env::var(EnvFilter::DEFAULT_ENV).ok())?;
    let timer = OffsetTime::local_rfc_3339()
        .unwrap_or_else(|_| OffsetTime::new(UtcOffset::UTC, Rfc3339));

    let console = fmt::layer()
        .with_timer(timer.clone())
        .with_ansi(config.ansi)
        .with_writer(io::stderr);

    let (file, guard) = match &config.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDirectory {
                path: dir.clone(),
                source,
            })?;
            let appender =
                tracing_appender::rolling::never(dir, format!("{}.log", config.file_prefix));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_timer(timer)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard { _file: guard })
}

/// Build the level filter, letting a non-empty `env_override` win over `level`.
fn build_filter(level: &str, env_override: Option<String>) -> Result<EnvFilter, LoggingError> {
    let configured =
        EnvFilter::try_new(level).map_err(|_| LoggingError::InvalidLevel(level.to_string()))?;

    match env_override.filter(|v| !v.trim().is_empty()) {
        Some(directive) => Ok(EnvFilter::try_new(&directive).unwrap_or(configured)),
        None => Ok(configured),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_console_only() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.directory.is_none());
        assert!(config.log_file().is_none());
    }

    #[test]
    fn test_log_file_path() {
        let config = LoggingConfig::default().with_directory(PathBuf::from("/tmp/logs"));
        assert_eq!(
            config.log_file(),
            Some(PathBuf::from("/tmp/logs/eventures.log"))
        );
    }

    #[test]
    fn test_build_filter_accepts_directives() {
        assert!(build_filter("debug", None).is_ok());
        assert!(build_filter("eventures=trace,warn", None).is_ok());
    }

    #[test]
    fn test_build_filter_rejects_garbage() {
        let err = build_filter("eventures=notalevel", None).unwrap_err();
        assert!(matches!(err, LoggingError::InvalidLevel(_)));
    }

    #[test]
    fn test_env_override_wins() {
        let filter = build_filter("info", Some("debug".to_string())).unwrap();
        assert_eq!(filter.to_string(), "debug");

        let filter = build_filter("info", Some("  ".to_string())).unwrap();
        assert_eq!(filter.to_string(), "info");
    }
}
