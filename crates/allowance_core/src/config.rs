//! Runtime configuration resolved from the environment.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - Resolution never touches the filesystem.
//! - A relative log directory is resolved against the working directory,
//!   since `init_logging` only accepts absolute paths.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DATA_PATH_VAR: &str = "ALLOWANCE_DATA_PATH";
pub const LOG_LEVEL_VAR: &str = "ALLOWANCE_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "ALLOWANCE_LOG_DIR";

const DEFAULT_DATA_FILE: &str = "allowance.json";

/// Process-level settings for front ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Location of the persisted document.
    pub data_path: PathBuf,
    pub log_level: String,
    /// Absolute log directory. File logging is disabled when unset.
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, which maps variable names
    /// to values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            data_path: read(DATA_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
            log_level: read(LOG_LEVEL_VAR).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_VAR).map(absolute_dir),
        }
    }
}

fn absolute_dir(value: String) -> PathBuf {
    let path = PathBuf::from(value);
    std::path::absolute(&path).unwrap_or(path)
}
