//! Counters collected during batch runs

use serde::Serialize;

/// Counters for one or more batch runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    /// Rows looked at
    pub processed: usize,

    /// Rows whose geography was written back
    pub updated: usize,

    /// Rows that produced more than one fact
    pub split: usize,

    /// New rows created from extra facts
    pub inserted: usize,

    /// Rows left as they were
    pub unchanged: usize,

    /// Rows with no recoverable location
    pub skipped: usize,

    /// Rows filled from the gazetteer
    pub enriched: usize,

    /// Rows removed by dedup
    pub deleted: usize,

    /// Franchises swept by dedup
    pub franchises: usize,

    /// Calls made to the extraction service
    pub fallback_calls: u32,

    /// Store failures
    pub errors: usize,
}

impl BatchStats {
    /// Create empty counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a store failure
    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    /// Record a dedup deletion batch
    pub fn record_deletion(&mut self, count: usize) {
        self.deleted += count;
    }

    /// Add another run's counters to these
    pub fn absorb(&mut self, other: &BatchStats) {
        self.processed += other.processed;
        self.updated += other.updated;
        self.split += other.split;
        self.inserted += other.inserted;
        self.unchanged += other.unchanged;
        self.skipped += other.skipped;
        self.enriched += other.enriched;
        self.deleted += other.deleted;
        self.franchises += other.franchises;
        self.fallback_calls += other.fallback_calls;
        self.errors += other.errors;
    }

    /// Human-readable report; zero counters are left out
    pub fn summary(&self) -> String {
        let rows = [
            ("Processed", self.processed),
            ("Updated", self.updated),
            ("Split", self.split),
            ("Inserted", self.inserted),
            ("Unchanged", self.unchanged),
            ("Skipped", self.skipped),
            ("Enriched", self.enriched),
            ("Deleted", self.deleted),
            ("Franchises", self.franchises),
            ("Fallback calls", self.fallback_calls as usize),
            ("Errors", self.errors),
        ];

        let mut lines = vec![
            "Batch Summary".to_string(),
            "=============".to_string(),
        ];
        lines.extend(
            rows.iter()
                .filter(|(label, count)| *count > 0 || *label == "Processed")
                .map(|(label, count)| format!("{}: {}", label, count)),
        );
        lines.join("\n")
    }
}
