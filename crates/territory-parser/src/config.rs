//! Configuration for the location parser

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the LocationParser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum input text length (characters)
    pub max_text_length: usize,

    /// Send clauses without rule-based geography to the extraction service
    pub fallback_enabled: bool,

    /// Attempts per fallback clause, including the first
    pub max_attempts: u32,

    /// Fixed wait after a rate-limit signal (seconds)
    pub rate_limit_cooldown_secs: u64,

    /// Base backoff after a timeout or communication error (seconds, doubled per attempt)
    pub retry_backoff_secs: u64,

    /// Maximum time for a single extraction call (seconds)
    pub extraction_timeout_secs: u64,
}

impl ParserConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Cooldown after a rate-limit signal
    pub fn rate_limit_cooldown(&self) -> Duration {
        Duration::from_secs(self.rate_limit_cooldown_secs)
    }

    /// Backoff before retry number `attempt` (1-based) after a transient failure
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_secs(self.retry_backoff_secs.saturating_mul(factor))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.extraction_timeout_secs == 0 {
            return Err("extraction_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_text_length: 2_000,
            fallback_enabled: true,
            max_attempts: 3,
            rate_limit_cooldown_secs: 30,
            retry_backoff_secs: 2,
            extraction_timeout_secs: 60,
        }
    }
}

impl ParserConfig {
    /// Offline preset: rules and gazetteer only, the extraction service is never called
    pub fn offline() -> Self {
        Self {
            fallback_enabled: false,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
