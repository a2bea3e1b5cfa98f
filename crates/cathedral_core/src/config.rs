//! Runtime configuration and planner bootstrap.
//!
//! # Responsibility
//! - Resolve storage path, storage key, theme preference and logging
//!   settings from `CATHEDRAL_*` environment variables.
//! - Wire logging, the SQLite store and the planner together.
//!
//! # Invariants
//! - Blank or unset variables fall back to defaults; they are never errors.
//! - File logging is enabled only when a log directory is configured.

use crate::logging::{default_log_level, init_logging};
use crate::service::planner::{Planner, PlannerOptions, DEFAULT_STORAGE_KEY};
use crate::store::{SqliteKvStore, StoreError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "CATHEDRAL_DB_PATH";
pub const ENV_STORAGE_KEY: &str = "CATHEDRAL_STORAGE_KEY";
pub const ENV_LOG_LEVEL: &str = "CATHEDRAL_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CATHEDRAL_LOG_DIR";
pub const ENV_PREFERS_DARK: &str = "CATHEDRAL_PREFERS_DARK";

const DEFAULT_DB_FILE_NAME: &str = "cathedral.sqlite3";

/// Resolved core settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub storage_key: String,
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logs.
    pub log_dir: Option<PathBuf>,
    pub prefers_dark: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
            prefers_dark: false,
        }
    }
}

impl CoreConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };
        let defaults = Self::default();

        Self {
            db_path: value(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            storage_key: value(ENV_STORAGE_KEY).unwrap_or(defaults.storage_key),
            log_level: value(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: value(ENV_LOG_DIR).map(PathBuf::from),
            prefers_dark: value(ENV_PREFERS_DARK)
                .map(|raw| parse_flag(&raw))
                .unwrap_or(defaults.prefers_dark),
        }
    }

    pub fn planner_options(&self) -> PlannerOptions {
        PlannerOptions {
            storage_key: self.storage_key.clone(),
            prefers_dark: self.prefers_dark,
        }
    }

    /// Starts logging (if configured), opens the store and loads the planner.
    pub fn open_planner(&self) -> Result<Planner<SqliteKvStore>, BootstrapError> {
        if let Some(log_dir) = &self.log_dir {
            let log_dir = log_dir
                .to_str()
                .ok_or_else(|| BootstrapError::Logging("log dir is not valid UTF-8".to_string()))?;
            init_logging(&self.log_level, log_dir).map_err(BootstrapError::Logging)?;
        }

        let store = SqliteKvStore::open(&self.db_path)?;
        Ok(Planner::load(store, self.planner_options()))
    }
}

/// Failure while wiring the planner for a session.
#[derive(Debug)]
pub enum BootstrapError {
    Logging(String),
    Store(StoreError),
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(message) => write!(f, "logging init failed: {message}"),
            Self::Store(err) => write!(f, "store open failed: {err}"),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for BootstrapError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "dark"
    )
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, ENV_DB_PATH, ENV_LOG_DIR, ENV_PREFERS_DARK, ENV_STORAGE_KEY};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> CoreConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CoreConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn unset_and_blank_values_use_defaults() {
        let config = config_from(&[(ENV_STORAGE_KEY, "   ")]);
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.storage_key, "app_state");
        assert!(config.db_path.ends_with("cathedral.sqlite3"));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_from(&[
            (ENV_DB_PATH, "/tmp/planner.db"),
            (ENV_STORAGE_KEY, "cathedral"),
            (ENV_LOG_DIR, "/tmp/cathedral-logs"),
            (ENV_PREFERS_DARK, "TRUE"),
        ]);
        assert_eq!(config.db_path, PathBuf::from("/tmp/planner.db"));
        assert_eq!(config.storage_key, "cathedral");
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/cathedral-logs")));
        assert!(config.prefers_dark);

        let options = config.planner_options();
        assert_eq!(options.storage_key, "cathedral");
        assert!(options.prefers_dark);
    }

    #[test]
    fn open_planner_uses_configured_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig {
            db_path: dir.path().join("planner.db"),
            ..CoreConfig::default()
        };

        {
            let mut planner = config.open_planner().unwrap();
            planner.set_dark_mode(true);
        }
        let planner = config.open_planner().unwrap();
        assert!(planner.dark_mode());
    }
}
