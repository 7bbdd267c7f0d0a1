//! Persisted application configuration.
//!
//! All durable state lives in one JSON file: the watched directory, the sort
//! destination, and the move ledger of the most recent pass. The file is
//! read at startup and rewritten on every configuration change and every
//! completed sort or undo pass.
//!
//! Loading is forgiving: a missing or unparseable file yields the default
//! configuration instead of an error, so a corrupt file never blocks an
//! operation. Saving is atomic: the new contents are written to a sibling
//! temporary file which is then renamed over the target, so a crash mid-save
//! cannot leave a half-written configuration behind.

use crate::ledger::Ledger;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur while persisting configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to write or replace the configuration file.
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to serialize the configuration to JSON.
    SerializeFailed { reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::WriteFailed { path, source } => {
                write!(f, "Failed to write config {}: {}", path.display(), source)
            }
            ConfigError::SerializeFailed { reason } => {
                write!(f, "Failed to serialize config: {}", reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// The persisted configuration structure.
///
/// Every field has a serde default so a partial or older file still loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// The directory watched for new files.
    #[serde(default)]
    pub watch_dir: PathBuf,

    /// The directory category subfolders are created under.
    #[serde(default)]
    pub sort_dir: PathBuf,

    /// The move ledger of the most recent sort pass (destination -> source).
    #[serde(default)]
    pub ledger: Ledger,

    /// RFC 3339 timestamp of the last completed sort or undo pass.
    #[serde(default)]
    pub last_sorted_at: Option<String>,
}

/// Handle to the configuration file on disk.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration, falling back to defaults.
    ///
    /// A missing file yields `AppConfig::default()`. An unreadable or
    /// unparseable file is treated the same way (with a warning), never as a
    /// fatal error.
    pub fn load(&self) -> AppConfig {
        if !self.path.exists() {
            return AppConfig::default();
        }

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                eprintln!(
                    "Warning: could not read config {}: {}",
                    self.path.display(),
                    e
                );
                return AppConfig::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: ignoring unparseable config {}: {}",
                    self.path.display(),
                    e
                );
                AppConfig::default()
            }
        }
    }

    /// Saves the configuration, fully replacing the previous contents.
    ///
    /// Writes to a sibling temporary file and renames it over the target so
    /// the replacement is atomic.
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let json =
            serde_json::to_string_pretty(config).map_err(|e| ConfigError::SerializeFailed {
                reason: e.to_string(),
            })?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| ConfigError::WriteFailed {
            path: tmp_path.clone(),
            source: e,
        })?;

        fs::rename(&tmp_path, &self.path).map_err(|e| ConfigError::WriteFailed {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(())
    }
}
