//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use territory_dedup::DedupConfig;
use territory_janitor::JanitorConfig;
use territory_parser::ParserConfig;

/// CLI configuration.
///
/// Every section is optional in the file; command-line flags override it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Database locations
    #[serde(default)]
    pub storage: StorageSettings,

    /// Extraction service connection
    #[serde(default)]
    pub llm: LlmSettings,

    /// Location parser tuning
    #[serde(default)]
    pub parser: ParserConfig,

    /// Batch run tuning
    #[serde(default)]
    pub janitor: JanitorConfig,

    /// Dedup stages
    #[serde(default)]
    pub dedup: DedupConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Database file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Territory check database
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Postal-code gazetteer database
    #[serde(default = "default_gazetteer")]
    pub gazetteer: PathBuf,
}

/// Ollama connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl From<crate::cli::CliFormat> for OutputFormat {
    fn from(format: crate::cli::CliFormat) -> Self {
        match format {
            crate::cli::CliFormat::Table => OutputFormat::Table,
            crate::cli::CliFormat::Json => OutputFormat::Json,
            crate::cli::CliFormat::Quiet => OutputFormat::Quiet,
        }
    }
}

impl Config {
    /// Default configuration file path, `~/.territory/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".territory").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist; the default path falls back to defaults
    /// when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.parser
            .validate()
            .map_err(|e| CliError::Config(format!("[parser] {}", e)))?;
        self.janitor
            .validate()
            .map_err(|e| CliError::Config(format!("[janitor] {}", e)))?;
        if self.llm.model.trim().is_empty() {
            return Err(CliError::Config("[llm] model must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database: default_database(),
            gazetteer: default_gazetteer(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_database() -> PathBuf {
    PathBuf::from("territory.db")
}

fn default_gazetteer() -> PathBuf {
    PathBuf::from("gazetteer.db")
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.1".to_string()
}
