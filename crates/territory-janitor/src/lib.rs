//! Territory Janitor
//!
//! Batch orchestration over the territory store.
//!
//! # Overview
//!
//! The Janitor drives three idempotent maintenance runs:
//! - **Parsing**: rows without geography are parsed; multi-place rows are split
//! - **Enrichment**: rows with a postal code get missing fields from the gazetteer
//! - **Dedup**: redundant rows are removed franchise by franchise
//!
//! Runs are sequential and page through the store by id cursor, so stopping
//! between rows loses nothing.
//!
//! # Configuration
//!
//! ```toml
//! [janitor]
//! page_size = 100
//! record_limit = 5000
//! fallback_delay_ms = 1000
//! loop_until_empty = true
//! dry_run = false
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use territory_dedup::{DedupConfig, DedupEngine};
//! use territory_janitor::{Janitor, JanitorConfig};
//! use territory_store::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = SqliteStore::new("territory.db")?;
//! let engine = DedupEngine::new(DedupConfig::default());
//! let mut janitor = Janitor::new(JanitorConfig::default());
//!
//! let stats = janitor.dedup_sweep(&engine, &mut store, None)?;
//! println!("{}", stats.summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod janitor;
mod metrics;

pub use config::JanitorConfig;
pub use error::JanitorError;
pub use janitor::Janitor;
pub use metrics::BatchStats;
