//! CLI error type.

use std::path::PathBuf;

use eventures::logging::LoggingError;
use eventures::session::ConfigError;
use eventures::source::SourceError;
use thiserror::Error;

use crate::config::ConfigFileError;

/// Errors surfaced to the user by a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),

    #[error("invalid session settings: {0}")]
    Session(#[from] ConfigError),

    #[error("failed to start logging: {0}")]
    Logging(#[from] LoggingError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse events from {path}: {source}")]
    Events {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("event source failed: {0}")]
    Source(#[from] SourceError),

    #[error("failed to start runtime: {0}")]
    Runtime(std::io::Error),
}
