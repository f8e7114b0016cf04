//! Configuration file for the command-line front end.
//!
//! Settings live in `~/.eventures/config.ini`:
//!
//! ```ini
//! [session]
//! page_size = 20
//! fetch_timeout_secs = 30
//! exact_page = false
//!
//! [filters]
//! location = wellington
//!
//! [logging]
//! level = info
//! directory = /home/user/.eventures/logs
//! ```
//!
//! A missing file yields the defaults. Unknown keys are ignored.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use eventures::logging::{LoggingConfig, DEFAULT_LOG_LEVEL};
use eventures::paging::DEFAULT_PAGE_SIZE;
use eventures::session::{SessionConfig, DEFAULT_FETCH_TIMEOUT_SECS};
use ini::Ini;
use thiserror::Error;

/// Directory under the home directory holding the config file.
pub const CONFIG_DIR_NAME: &str = ".eventures";

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors reading, writing or editing the config file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown configuration key {0:?}")]
    UnknownKey(String),

    #[error("could not determine home directory")]
    NoHomeDirectory,
}

/// `[session]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub page_size: usize,
    pub fetch_timeout_secs: u64,
    pub exact_page: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            exact_page: false,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub level: String,
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
        }
    }
}

/// Parsed contents of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub session: SessionSettings,
    pub filters: BTreeMap<String, String>,
    pub logging: LoggingSettings,
}

/// Path of the user's config file.
pub fn config_file_path() -> Result<PathBuf, ConfigFileError> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or(ConfigFileError::NoHomeDirectory)
}

impl ConfigFile {
    /// Load the user's config file, or defaults if it does not exist.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path()?)
    }

    /// Load from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigFileError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            let (section, name) = (key.section(), key.key_name());
            if let Some(value) = ini.get_from(Some(section), &name) {
                key.set(&mut config, value)?;
            }
        }
        if let Some(filters) = ini.section(Some(FILTERS_SECTION)) {
            config.filters = filters
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
        }

        Ok(config)
    }

    /// Save to the user's config file, creating its directory if needed.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path()?)
    }

    /// Save to `path`, creating its directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigFileError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        for (name, value) in &self.filters {
            ini.with_section(Some(FILTERS_SECTION))
                .set(name.as_str(), value.as_str());
        }

        ini.write_to_file(path)
            .map_err(|source| ConfigFileError::Write {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Session settings for the library.
    pub fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::new()
            .with_page_size(self.session.page_size)
            .with_fetch_timeout(Duration::from_secs(self.session.fetch_timeout_secs))
            .with_exact_page(self.session.exact_page);
        for (name, value) in &self.filters {
            config = config.with_filter(name, value);
        }
        config
    }

    /// Logging settings for the library.
    pub fn logging_config(&self) -> LoggingConfig {
        let config = LoggingConfig::default().with_level(self.logging.level.clone());
        match &self.logging.directory {
            Some(dir) => config.with_directory(dir.clone()),
            None => config,
        }
    }
}

const SESSION_SECTION: &str = "session";
const FILTERS_SECTION: &str = "filters";
const LOGGING_SECTION: &str = "logging";

/// A settable configuration key, written `section.key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigKey {
    PageSize,
    FetchTimeoutSecs,
    ExactPage,
    LogLevel,
    LogDirectory,
    Filter(String),
}

impl ConfigKey {
    /// Fixed keys in display order. Filters are open-ended and not listed.
    pub fn all() -> Vec<ConfigKey> {
        vec![
            ConfigKey::PageSize,
            ConfigKey::FetchTimeoutSecs,
            ConfigKey::ExactPage,
            ConfigKey::LogLevel,
            ConfigKey::LogDirectory,
        ]
    }

    /// Section the key lives in.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::PageSize | ConfigKey::FetchTimeoutSecs | ConfigKey::ExactPage => {
                SESSION_SECTION
            }
            ConfigKey::LogLevel | ConfigKey::LogDirectory => LOGGING_SECTION,
            ConfigKey::Filter(_) => FILTERS_SECTION,
        }
    }

    /// Name of the key within its section.
    pub fn key_name(&self) -> String {
        match self {
            ConfigKey::PageSize => "page_size".to_string(),
            ConfigKey::FetchTimeoutSecs => "fetch_timeout_secs".to_string(),
            ConfigKey::ExactPage => "exact_page".to_string(),
            ConfigKey::LogLevel => "level".to_string(),
            ConfigKey::LogDirectory => "directory".to_string(),
            ConfigKey::Filter(name) => name.clone(),
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::PageSize => config.session.page_size.to_string(),
            ConfigKey::FetchTimeoutSecs => config.session.fetch_timeout_secs.to_string(),
            ConfigKey::ExactPage => config.session.exact_page.to_string(),
            ConfigKey::LogLevel => config.logging.level.clone(),
            ConfigKey::LogDirectory => config
                .logging
                .directory
                .as_ref()
                .map(|dir| dir.display().to_string())
                .unwrap_or_default(),
            ConfigKey::Filter(name) => config.filters.get(name).cloned().unwrap_or_default(),
        }
    }

    /// Parse `value` and store it.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigFileError> {
        let invalid = |reason: &str| ConfigFileError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        match self {
            ConfigKey::PageSize => {
                let size: usize = value.trim().parse().map_err(|_| invalid("expected a number"))?;
                if size == 0 {
                    return Err(invalid("must be greater than zero"));
                }
                config.session.page_size = size;
            }
            ConfigKey::FetchTimeoutSecs => {
                let secs: u64 = value.trim().parse().map_err(|_| invalid("expected a number"))?;
                if secs == 0 {
                    return Err(invalid("must be greater than zero"));
                }
                config.session.fetch_timeout_secs = secs;
            }
            ConfigKey::ExactPage => {
                config.session.exact_page = parse_bool(value).ok_or_else(|| invalid("expected true or false"))?;
            }
            ConfigKey::LogLevel => {
                let level = value.trim();
                if level.is_empty() {
                    return Err(invalid("must not be empty"));
                }
                config.logging.level = level.to_string();
            }
            ConfigKey::LogDirectory => {
                let dir = value.trim();
                config.logging.directory = (!dir.is_empty()).then(|| PathBuf::from(dir));
            }
            ConfigKey::Filter(name) => {
                if value.is_empty() {
                    config.filters.remove(name);
                } else {
                    config.filters.insert(name.clone(), value.to_string());
                }
            }
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigFileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(name) = s.strip_prefix("filters.") {
            if !name.is_empty() {
                return Ok(ConfigKey::Filter(name.to_string()));
            }
        }
        ConfigKey::all()
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigFileError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}
