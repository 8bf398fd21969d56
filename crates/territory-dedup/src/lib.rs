//! Territory Deduplication Engine
//!
//! Reduces each franchise's territory checks to a non-redundant set.
//!
//! The engine runs two stages:
//! - Exact duplicates: identical raw text and geography, the newest check survives
//! - Hierarchy: a check contained in a broader one of the same franchise is
//!   removed or supersedes it, depending on status and date
//!
//! Decisions are a monotone reduction: each pair is looked at once and a
//! deletion is never reversed.
//!
//! # Examples
//!
//! ```
//! use territory_dedup::{DedupConfig, DedupEngine};
//! use territory_domain::{AvailabilityStatus, TerritoryCheck};
//!
//! let engine = DedupEngine::new(DedupConfig::default());
//! let older = TerritoryCheck::new("f1", "Oakland, CA", AvailabilityStatus::Available, Some(1));
//! let newer = TerritoryCheck::new("f1", "oakland,  ca", AvailabilityStatus::Available, Some(2));
//!
//! let outcome = engine.dedupe(&[older.clone(), newer.clone()]);
//! assert!(outcome.delete_ids.contains(&older.id));
//! assert!(outcome.keep_ids.contains(&newer.id));
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod scope;

pub use config::DedupConfig;
pub use engine::{DedupDecision, DedupEngine, DedupOutcome, DedupReason, ReviewPair};
pub use scope::{is_contained, normalize_name, Scope};
