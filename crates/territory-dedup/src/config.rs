//! Dedup engine configuration

use serde::{Deserialize, Serialize};

/// Which dedup stages run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Remove checks sharing the same raw text
    pub exact_duplicates: bool,

    /// Apply containment rules between checks of differing scope
    pub hierarchy: bool,

    /// Fill missing city/county/state from the gazetteer before comparing
    pub resolve_postal_codes: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            exact_duplicates: true,
            hierarchy: true,
            resolve_postal_codes: true,
        }
    }
}

impl DedupConfig {
    /// Only collapse identical raw text; no geographic reasoning
    pub fn exact_only() -> Self {
        Self {
            exact_duplicates: true,
            hierarchy: false,
            resolve_postal_codes: false,
        }
    }

    /// Load from a TOML string
    pub fn from_toml(s: &str) -> Result<Self, String> {
        toml::from_str(s).map_err(|e| format!("Failed to parse dedup config: {}", e))
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize dedup config: {}", e))
    }
}
