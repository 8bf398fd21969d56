//! Command implementations.

pub mod check;
pub mod dedup;
pub mod enrich;
pub mod gazetteer;
pub mod parse;

pub use self::check::execute_check;
pub use self::dedup::execute_dedup;
pub use self::enrich::execute_enrich;
pub use self::gazetteer::execute_gazetteer;
pub use self::parse::execute_parse;

use crate::config::Config;
use crate::error::Result;
use std::path::PathBuf;
use std::sync::Arc;
use territory_llm::OllamaProvider;
use territory_parser::{LocationParser, ParserConfig};
use territory_store::{SqliteGazetteer, SqliteStore};
use tracing::debug;

/// Resolved configuration and database locations shared by all commands.
pub struct Context {
    /// Loaded configuration
    pub config: Config,
    /// Territory check database
    pub db: PathBuf,
    /// Gazetteer database
    pub gazetteer: PathBuf,
}

impl Context {
    /// Combine the config file with command-line overrides.
    pub fn new(config: Config, db: Option<PathBuf>, gazetteer: Option<PathBuf>) -> Self {
        let db = db.unwrap_or_else(|| config.storage.database.clone());
        let gazetteer = gazetteer.unwrap_or_else(|| config.storage.gazetteer.clone());
        Self {
            config,
            db,
            gazetteer,
        }
    }

    /// Open the check database.
    pub fn open_store(&self) -> Result<SqliteStore> {
        debug!("Opening store at {}", self.db.display());
        Ok(SqliteStore::new(&self.db)?)
    }

    /// Gazetteer opened on first lookup; a missing file only means misses.
    pub fn gazetteer(&self) -> Arc<SqliteGazetteer> {
        Arc::new(SqliteGazetteer::open_lazy(&self.gazetteer))
    }

    /// Parser backed by the configured Ollama model.
    pub fn parser(&self, offline: bool) -> LocationParser<OllamaProvider> {
        let config = self.parser_config(offline);
        let provider = OllamaProvider::new(&self.config.llm.endpoint, &self.config.llm.model)
            .with_timeout(config.extraction_timeout());
        LocationParser::new(provider, self.gazetteer(), config)
    }

    fn parser_config(&self, offline: bool) -> ParserConfig {
        let mut config = self.config.parser.clone();
        if offline {
            config.fallback_enabled = false;
        }
        config
    }
}
