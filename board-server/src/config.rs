//! Server Configuration
//!
//! Loaded from a JSON file; every field has a default so a partial (or
//! missing) file still yields a usable configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default key length past which a move triggers a rebalance
pub const DEFAULT_REBALANCE_THRESHOLD: usize = 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    /// SQLite database file, or ":memory:"
    pub db_path: PathBuf,
    /// Rebalance a collection when a move produces a longer key; `null` disables
    pub rebalance_threshold: Option<usize>,
    /// Directory for rolling log files; `null` leaves logging to the host
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("board.db"),
            rebalance_threshold: Some(DEFAULT_REBALANCE_THRESHOLD),
            log_dir: None,
        }
    }
}

impl ServerConfig {
    /// Configuration backed by an in-memory database
    pub fn in_memory() -> Self {
        Self::default().with_db_path(":memory:")
    }

    /// Read a JSON config file
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        serde_json::from_str(&text)
            .map_err(|e| format!("Invalid config {}: {}", path.display(), e))
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    pub fn with_rebalance_threshold(mut self, threshold: Option<usize>) -> Self {
        self.rebalance_threshold = threshold;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }
}
