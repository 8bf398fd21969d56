//! Configuration for batch runs

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Paging, pacing and safety switches for the janitor
///
/// # Examples
///
/// ```
/// use territory_janitor::JanitorConfig;
///
/// let config = JanitorConfig::default();
/// assert_eq!(config.page_size, 100);
/// assert!(!config.loop_until_empty);
///
/// let config = JanitorConfig::backlog();
/// assert!(config.loop_until_empty);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JanitorConfig {
    /// Rows fetched per page
    pub page_size: usize,

    /// Stop after this many rows in one run
    pub record_limit: Option<usize>,

    /// Pause after a row that needed the extraction service, in milliseconds
    pub fallback_delay_ms: u64,

    /// Keep paging until the backlog is empty instead of stopping after one page
    pub loop_until_empty: bool,

    /// Log intended changes without writing them
    pub dry_run: bool,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            record_limit: None,
            fallback_delay_ms: 1000,
            loop_until_empty: false,
            dry_run: false,
        }
    }
}

impl JanitorConfig {
    /// Drain the whole backlog in one run
    pub fn backlog() -> Self {
        Self {
            loop_until_empty: true,
            ..Self::default()
        }
    }

    /// Pause applied after an extraction-service row
    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), String> {
        if self.page_size == 0 {
            return Err("page_size must be at least 1".to_string());
        }
        if self.record_limit == Some(0) {
            return Err("record_limit must be at least 1 when set".to_string());
        }
        Ok(())
    }

    /// Load from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse janitor config: {}", e))
    }
}
