//! Feed processor configuration loaded from environment variables.

use serde::Deserialize;

use crate::error::AppError;

/// Feed processor configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Output ===
    /// Write a book snapshot after every N rows.
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval: u64,

    /// Write book snapshots at all.
    #[serde(default = "default_true")]
    pub emit_state: bool,

    /// Write a line for every recorded trade.
    #[serde(default = "default_true")]
    pub emit_trades: bool,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_snapshot_interval() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_interval: default_snapshot_interval(),
            emit_state: true,
            emit_trades: true,
            rust_log: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.snapshot_interval == 0 {
            return Err(AppError::InvalidConfig(
                "SNAPSHOT_INTERVAL must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
