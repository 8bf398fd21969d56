//! Batch runs over stored territory checks

use crate::{BatchStats, JanitorConfig, JanitorError};
use std::fmt::Display;
use territory_dedup::DedupEngine;
use territory_domain::traits::{CheckQuery, LlmProvider, RateLimited, TerritoryStore};
use territory_domain::{CheckId, Gazetteer, TerritoryCheck};
use territory_parser::{enrich, LocationParser};
use tracing::{debug, error, info, warn};

/// Runs parsing, enrichment and dedup over the store in batches
///
/// Every unit of work is idempotent, so a run can be stopped and restarted at
/// any point. Per-row store failures are counted and never abort a run.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use territory_domain::StaticGazetteer;
/// use territory_janitor::{Janitor, JanitorConfig};
/// use territory_llm::MockProvider;
/// use territory_parser::{LocationParser, ParserConfig};
/// use territory_store::SqliteStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = SqliteStore::new("territory.db")?;
/// let parser = LocationParser::new(
///     MockProvider::default(),
///     Arc::new(StaticGazetteer::new()),
///     ParserConfig::offline(),
/// );
///
/// let mut janitor = Janitor::new(JanitorConfig::backlog());
/// let stats = janitor.parse_backlog(&parser, &mut store).await?;
/// println!("{}", stats.summary());
/// # Ok(())
/// # }
/// ```
pub struct Janitor {
    config: JanitorConfig,
    totals: BatchStats,
}

impl Janitor {
    /// Create a new Janitor with the given configuration
    pub fn new(config: JanitorConfig) -> Self {
        Self {
            config,
            totals: BatchStats::new(),
        }
    }

    /// Create a Janitor with default configuration
    pub fn default_config() -> Self {
        Self::new(JanitorConfig::default())
    }

    /// Active configuration
    pub fn config(&self) -> &JanitorConfig {
        &self.config
    }

    /// Counters accumulated over every run of this janitor
    pub fn totals(&self) -> &BatchStats {
        &self.totals
    }

    /// Reset accumulated counters
    pub fn reset_totals(&mut self) {
        self.totals = BatchStats::new();
    }

    /// Parse rows that have no geography yet
    ///
    /// Rows are visited in id order through a cursor. The first fact replaces
    /// the row's geography; extra facts become sibling rows sharing the
    /// franchise, status, date and raw text.
    pub async fn parse_backlog<L, S>(
        &mut self,
        parser: &LocationParser<L>,
        store: &mut S,
    ) -> Result<BatchStats, JanitorError>
    where
        L: LlmProvider + Send + Sync + 'static,
        L::Error: RateLimited + Display,
        S: TerritoryStore,
        S::Error: Display,
    {
        self.config.validate().map_err(JanitorError::Config)?;
        let mut stats = BatchStats::new();
        let mut cursor: Option<CheckId> = None;

        while let Some(limit) = self.next_page_size(&stats) {
            let query = CheckQuery {
                missing_geography: true,
                after: cursor,
                limit: Some(limit),
                ..Default::default()
            };
            let page = match store.query_checks(&query) {
                Ok(page) => page,
                Err(e) => {
                    error!("Failed to read parse backlog: {}", e);
                    stats.record_error();
                    break;
                }
            };

            for check in &page {
                cursor = Some(check.id);
                stats.processed += 1;
                self.parse_one(parser, store, check, &mut stats).await;
            }

            if page.len() < limit || !self.config.loop_until_empty {
                break;
            }
        }

        info!(
            "Parse run finished: {} processed, {} updated, {} inserted, {} skipped",
            stats.processed, stats.updated, stats.inserted, stats.skipped
        );
        self.totals.absorb(&stats);
        Ok(stats)
    }

    async fn parse_one<L, S>(
        &self,
        parser: &LocationParser<L>,
        store: &mut S,
        check: &TerritoryCheck,
        stats: &mut BatchStats,
    ) where
        L: LlmProvider + Send + Sync + 'static,
        L::Error: RateLimited + Display,
        S: TerritoryStore,
        S::Error: Display,
    {
        let hint = check.location.state_code.as_deref();
        let outcome = match parser.parse(&check.location_raw, hint).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Skipping {}: {}", check.id, e);
                stats.skipped += 1;
                return;
            }
        };

        stats.fallback_calls += outcome.fallback_attempts;
        let used_fallback = outcome.used_fallback;

        // Rows written before the parsed marker existed: one that already
        // holds a parsed fact had its siblings inserted back then.
        let already_parsed = check.location.has_geography()
            && outcome.facts.iter().any(|fact| *fact == check.location);
        let mut facts = outcome.facts.into_iter();

        match facts.next() {
            None => {
                debug!("No location in '{}' ({})", check.location_raw, check.id);
                stats.skipped += 1;
            }
            Some(_) if already_parsed => {
                debug!("{} already parsed", check.id);
                self.mark_parsed(store, check, stats);
                stats.unchanged += 1;
            }
            Some(first) => {
                let mut updated = check.clone().with_location(first);
                updated.parsed = true;
                if updated.location == check.location {
                    self.mark_parsed(store, check, stats);
                    stats.unchanged += 1;
                } else if self.write_update(store, &updated, stats) {
                    stats.updated += 1;
                }

                let siblings: Vec<TerritoryCheck> =
                    facts.map(|fact| check.split_sibling(fact)).collect();
                if !siblings.is_empty() {
                    stats.split += 1;
                }
                for sibling in &siblings {
                    if self.write_insert(store, sibling, stats) {
                        stats.inserted += 1;
                    }
                }
            }
        }

        if used_fallback && self.config.fallback_delay_ms > 0 {
            tokio::time::sleep(self.config.fallback_delay()).await;
        }
    }

    /// Remove redundant checks, for every franchise or a single one
    pub fn dedup_sweep<S>(
        &mut self,
        engine: &DedupEngine,
        store: &mut S,
        franchise: Option<&str>,
    ) -> Result<BatchStats, JanitorError>
    where
        S: TerritoryStore,
        S::Error: Display,
    {
        self.config.validate().map_err(JanitorError::Config)?;
        let mut stats = BatchStats::new();

        let franchises = match franchise {
            Some(id) => vec![id.to_string()],
            None => match store.franchises_with_multiple_checks() {
                Ok(ids) => ids,
                Err(e) => {
                    error!("Failed to list franchises: {}", e);
                    stats.record_error();
                    self.totals.absorb(&stats);
                    return Ok(stats);
                }
            },
        };

        for franchise_id in franchises {
            let query = CheckQuery {
                franchise_id: Some(franchise_id.clone()),
                ..Default::default()
            };
            let checks = match store.query_checks(&query) {
                Ok(checks) => checks,
                Err(e) => {
                    error!("Failed to read checks for franchise {}: {}", franchise_id, e);
                    stats.record_error();
                    continue;
                }
            };

            stats.franchises += 1;
            stats.processed += checks.len();

            let outcome = engine.dedupe(&checks);
            for pair in &outcome.review {
                info!(
                    "Franchise {}: {} and {} need manual review",
                    franchise_id, pair.first, pair.second
                );
            }
            if outcome.delete_ids.is_empty() {
                continue;
            }

            let ids: Vec<CheckId> = outcome.delete_ids.iter().copied().collect();
            if self.config.dry_run {
                for decision in &outcome.decisions {
                    info!(
                        "DRY RUN: Would delete {} ({}), superseded by {}",
                        decision.deleted,
                        decision.reason.as_str(),
                        decision.superseded_by
                    );
                }
                stats.record_deletion(ids.len());
                continue;
            }

            match store.delete_checks(&ids) {
                Ok(count) => stats.record_deletion(count),
                Err(e) => {
                    error!("Failed to delete checks for franchise {}: {}", franchise_id, e);
                    stats.record_error();
                }
            }
        }

        info!(
            "Dedup run finished: {} franchises, {} deleted",
            stats.franchises, stats.deleted
        );
        self.totals.absorb(&stats);
        Ok(stats)
    }

    /// Fill missing geography of rows carrying a postal code
    ///
    /// Only null fields are written; nothing already stored is overwritten.
    pub fn enrich_backlog<S>(
        &mut self,
        gazetteer: &dyn Gazetteer,
        store: &mut S,
    ) -> Result<BatchStats, JanitorError>
    where
        S: TerritoryStore,
        S::Error: Display,
    {
        self.config.validate().map_err(JanitorError::Config)?;
        let mut stats = BatchStats::new();
        let mut cursor: Option<CheckId> = None;

        while let Some(limit) = self.next_page_size(&stats) {
            let query = CheckQuery {
                needs_enrichment: true,
                after: cursor,
                limit: Some(limit),
                ..Default::default()
            };
            let page = match store.query_checks(&query) {
                Ok(page) => page,
                Err(e) => {
                    error!("Failed to read enrichment backlog: {}", e);
                    stats.record_error();
                    break;
                }
            };

            for check in &page {
                cursor = Some(check.id);
                stats.processed += 1;

                let mut enriched = check.clone();
                if !enrich(&mut enriched.location, gazetteer) {
                    stats.unchanged += 1;
                    continue;
                }
                if self.write_update(store, &enriched, &mut stats) {
                    stats.enriched += 1;
                }
            }

            if page.len() < limit || !self.config.loop_until_empty {
                break;
            }
        }

        info!(
            "Enrichment run finished: {} processed, {} enriched",
            stats.processed, stats.enriched
        );
        self.totals.absorb(&stats);
        Ok(stats)
    }

    /// Rows to request next, or `None` once the record limit is reached
    fn next_page_size(&self, stats: &BatchStats) -> Option<usize> {
        let remaining = match self.config.record_limit {
            Some(limit) => limit.saturating_sub(stats.processed),
            None => self.config.page_size,
        };
        (remaining > 0).then(|| remaining.min(self.config.page_size))
    }

    /// Take an unchanged row out of the parse backlog
    fn mark_parsed<S>(&self, store: &mut S, check: &TerritoryCheck, stats: &mut BatchStats)
    where
        S: TerritoryStore,
        S::Error: Display,
    {
        if self.config.dry_run || check.parsed {
            return;
        }
        let mut marked = check.clone();
        marked.parsed = true;
        if let Err(e) = store.update_check(&marked) {
            error!("Failed to mark {} as parsed: {}", check.id, e);
            stats.record_error();
        }
    }

    fn write_update<S>(&self, store: &mut S, check: &TerritoryCheck, stats: &mut BatchStats) -> bool
    where
        S: TerritoryStore,
        S::Error: Display,
    {
        if self.config.dry_run {
            info!(
                "DRY RUN: Would set {} to {}",
                check.id,
                check.location.display_name()
            );
            return true;
        }

        match store.update_check(check) {
            Ok(true) => true,
            Ok(false) => {
                warn!("Check {} disappeared before update", check.id);
                stats.record_error();
                false
            }
            Err(e) => {
                error!("Failed to update {}: {}", check.id, e);
                stats.record_error();
                false
            }
        }
    }

    fn write_insert<S>(&self, store: &mut S, check: &TerritoryCheck, stats: &mut BatchStats) -> bool
    where
        S: TerritoryStore,
        S::Error: Display,
    {
        if self.config.dry_run {
            info!(
                "DRY RUN: Would add {} for franchise {}",
                check.location.display_name(),
                check.franchise_id
            );
            return true;
        }

        match store.insert_check(check) {
            Ok(_) => true,
            Err(e) => {
                error!("Failed to insert split row for {}: {}", check.franchise_id, e);
                stats.record_error();
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use territory_dedup::DedupConfig;
    use territory_domain::{AvailabilityStatus, LocationFact, PostalRecord, StaticGazetteer};
    use territory_llm::MockProvider;
    use territory_parser::ParserConfig;

    // In-memory store; `fail_writes` makes every mutation fail
    #[derive(Default)]
    struct MockStore {
        checks: Vec<TerritoryCheck>,
        fail_writes: bool,
        fail_reads: bool,
        unreadable_franchise: Option<String>,
    }

    impl MockStore {
        fn add(&mut self, raw: &str, state: Option<&str>) -> CheckId {
            let mut check = TerritoryCheck::new("f1", raw, AvailabilityStatus::Available, Some(10));
            check.location.state_code = state.map(String::from);
            let id = check.id;
            self.checks.push(check);
            id
        }

        fn get(&self, id: CheckId) -> &TerritoryCheck {
            self.checks.iter().find(|c| c.id == id).unwrap()
        }
    }

    impl TerritoryStore for MockStore {
        type Error = String;

        fn insert_check(&mut self, check: &TerritoryCheck) -> Result<CheckId, Self::Error> {
            if self.fail_writes {
                return Err("disk full".to_string());
            }
            self.checks.push(check.clone());
            Ok(check.id)
        }

        fn get_check(&self, id: CheckId) -> Result<Option<TerritoryCheck>, Self::Error> {
            Ok(self.checks.iter().find(|c| c.id == id).cloned())
        }

        fn query_checks(&self, query: &CheckQuery) -> Result<Vec<TerritoryCheck>, Self::Error> {
            if self.fail_reads
                || (query.franchise_id.is_some() && query.franchise_id == self.unreadable_franchise)
            {
                return Err("database locked".to_string());
            }
            let mut results: Vec<TerritoryCheck> = self
                .checks
                .iter()
                .filter(|c| query.franchise_id.as_ref().map_or(true, |f| &c.franchise_id == f))
                .filter(|c| !query.missing_geography || (c.lacks_geography() && !c.parsed))
                .filter(|c| {
                    !query.needs_enrichment
                        || (c.location.postal_code.is_some() && c.location.city.is_none())
                })
                .filter(|c| query.after.map_or(true, |after| c.id > after))
                .cloned()
                .collect();
            results.sort_by_key(|c| c.id);
            if let Some(limit) = query.limit {
                results.truncate(limit);
            }
            Ok(results)
        }

        fn update_check(&mut self, check: &TerritoryCheck) -> Result<bool, Self::Error> {
            if self.fail_writes {
                return Err("disk full".to_string());
            }
            match self.checks.iter_mut().find(|c| c.id == check.id) {
                Some(existing) => {
                    existing.location = check.location.clone();
                    existing.parsed = check.parsed;
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        fn delete_checks(&mut self, ids: &[CheckId]) -> Result<usize, Self::Error> {
            if self.fail_writes {
                return Err("disk full".to_string());
            }
            let before = self.checks.len();
            self.checks.retain(|c| !ids.contains(&c.id));
            Ok(before - self.checks.len())
        }

        fn franchises_with_multiple_checks(&self) -> Result<Vec<String>, Self::Error> {
            let mut ids: Vec<String> = self.checks.iter().map(|c| c.franchise_id.clone()).collect();
            ids.sort();
            let multiple = ids
                .windows(2)
                .filter(|w| w[0] == w[1])
                .map(|w| w[0].clone())
                .collect::<std::collections::BTreeSet<_>>();
            Ok(multiple.into_iter().collect())
        }
    }

    fn gazetteer() -> StaticGazetteer {
        StaticGazetteer::new().with_record(PostalRecord {
            postal_code: "94551".to_string(),
            country: "US".to_string(),
            city: Some("Livermore".to_string()),
            county: Some("Alameda".to_string()),
            state_code: Some("CA".to_string()),
            latitude: Some(37.68),
            longitude: Some(-121.76),
        })
    }

    fn offline_parser() -> LocationParser<MockProvider> {
        LocationParser::new(MockProvider::default(), Arc::new(gazetteer()), ParserConfig::offline())
    }

    fn backlog_janitor() -> Janitor {
        Janitor::new(JanitorConfig {
            fallback_delay_ms: 0,
            ..JanitorConfig::backlog()
        })
    }

    #[tokio::test]
    async fn test_parse_backlog_updates_and_splits() {
        let mut store = MockStore::default();
        let oakland = store.add("Oakland, CA", None);
        let pair = store.add("Dallas or Amarillo, TX", None);
        let vague = store.add("call the broker", None);

        let mut janitor = backlog_janitor();
        let stats = janitor.parse_backlog(&offline_parser(), &mut store).await.unwrap();

        assert_eq!(stats.processed, 3);
        assert_eq!(stats.updated, 2);
        assert_eq!(stats.split, 1);
        assert_eq!(stats.inserted, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.errors, 0);

        assert_eq!(store.get(oakland).location.city.as_deref(), Some("Oakland"));
        assert_eq!(store.get(pair).location.city.as_deref(), Some("Dallas"));
        assert!(store.get(vague).lacks_geography());

        let amarillo = store.checks.iter().find(|c| c.location.city.as_deref() == Some("Amarillo")).unwrap();
        assert_eq!(amarillo.franchise_id, "f1");
        assert_eq!(amarillo.location_raw, "Dallas or Amarillo, TX");
        assert_eq!(amarillo.check_date, Some(10));
        assert_eq!(store.checks.len(), 4);
    }

    #[tokio::test]
    async fn test_state_only_split_is_not_repeated() {
        let mut store = MockStore::default();
        let id = store.add("Washington or Oregon", None);

        let mut janitor = backlog_janitor();
        let stats = janitor.parse_backlog(&offline_parser(), &mut store).await.unwrap();
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.updated, 1);
        assert_eq!(stats.inserted, 1);
        assert_eq!(store.checks.len(), 2);
        assert_eq!(store.get(id).location.state_code.as_deref(), Some("WA"));

        assert!(store.checks.iter().all(|c| c.parsed));

        let rerun = janitor.parse_backlog(&offline_parser(), &mut store).await.unwrap();
        assert_eq!(rerun.processed, 0, "written rows left the backlog");
        assert_eq!(store.checks.len(), 2);
    }

    #[tokio::test]
    async fn test_rows_from_earlier_runs_are_not_split_again() {
        let mut store = MockStore::default();
        let id = store.add("Washington or Oregon", Some("WA"));
        let mut oregon = store.get(id).split_sibling(LocationFact {
            state_code: Some("OR".to_string()),
            ..LocationFact::empty()
        });
        oregon.parsed = false;
        store.checks.push(oregon);

        let mut janitor = backlog_janitor();
        let stats = janitor.parse_backlog(&offline_parser(), &mut store).await.unwrap();
        assert_eq!(stats.processed, 2);
        assert_eq!(stats.unchanged, 2);
        assert_eq!(stats.inserted, 0);
        assert_eq!(store.checks.len(), 2);

        let rerun = janitor.parse_backlog(&offline_parser(), &mut store).await.unwrap();
        assert_eq!(rerun.processed, 0);
    }

    #[tokio::test]
    async fn test_fallback_state_only_row_is_asked_once() {
        let mut store = MockStore::default();
        store.add("somewhere up north", None);
        let llm = MockProvider::new(r#"[{"state_code": "MN"}]"#);
        let parser = LocationParser::new(llm.clone(), Arc::new(gazetteer()), ParserConfig::default());

        let mut janitor = backlog_janitor();
        let stats = janitor.parse_backlog(&parser, &mut store).await.unwrap();
        assert_eq!(stats.updated, 1);
        assert_eq!(store.checks[0].location.state_code.as_deref(), Some("MN"));

        let rerun = janitor.parse_backlog(&parser, &mut store).await.unwrap();
        assert_eq!(rerun.processed, 0);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_parse_backlog_uses_row_state_as_hint() {
        let mut store = MockStore::default();
        let id = store.add("Plano", Some("TX"));

        backlog_janitor().parse_backlog(&offline_parser(), &mut store).await.unwrap();
        let location = &store.get(id).location;
        assert_eq!(location.city.as_deref(), Some("Plano"));
        assert_eq!(location.state_code.as_deref(), Some("TX"));
    }

    #[tokio::test]
    async fn test_parse_backlog_dry_run_writes_nothing() {
        let mut store = MockStore::default();
        store.add("Dallas or Amarillo, TX", None);

        let mut janitor = Janitor::new(JanitorConfig {
            dry_run: true,
            ..JanitorConfig::backlog()
        });
        let stats = janitor.parse_backlog(&offline_parser(), &mut store).await.unwrap();

        assert_eq!(stats.updated, 1);
        assert_eq!(stats.inserted, 1);
        assert_eq!(store.checks.len(), 1);
        assert!(store.checks[0].lacks_geography());
    }

    #[tokio::test]
    async fn test_parse_backlog_single_page_and_limit() {
        let mut store = MockStore::default();
        for city in ["Tulsa, OK", "Wichita, KS", "Omaha, NE"] {
            store.add(city, None);
        }

        let mut janitor = Janitor::new(JanitorConfig {
            page_size: 2,
            fallback_delay_ms: 0,
            ..JanitorConfig::default()
        });
        let stats = janitor.parse_backlog(&offline_parser(), &mut store).await.unwrap();
        assert_eq!(stats.processed, 2, "single mode stops after one page");

        let mut store = MockStore::default();
        for city in ["Tulsa, OK", "Wichita, KS", "Omaha, NE"] {
            store.add(city, None);
        }
        let mut janitor = Janitor::new(JanitorConfig {
            page_size: 1,
            record_limit: Some(2),
            ..JanitorConfig::backlog()
        });
        let stats = janitor.parse_backlog(&offline_parser(), &mut store).await.unwrap();
        assert_eq!(stats.processed, 2);
        assert_eq!(janitor.totals().processed, 2);
    }

    #[tokio::test]
    async fn test_parse_backlog_counts_write_failures() {
        let mut store = MockStore::default();
        store.add("Dallas or Amarillo, TX", None);
        store.add("Oakland, CA", None);
        store.fail_writes = true;

        let stats = backlog_janitor()
            .parse_backlog(&offline_parser(), &mut store)
            .await
            .unwrap();
        assert_eq!(stats.processed, 2);
        assert_eq!(stats.updated, 0);
        assert_eq!(stats.errors, 3);
    }

    #[tokio::test]
    async fn test_read_failure_ends_run() {
        let mut store = MockStore::default();
        store.add("Oakland, CA", None);
        store.fail_reads = true;

        let stats = backlog_janitor()
            .parse_backlog(&offline_parser(), &mut store)
            .await
            .unwrap();
        assert_eq!(stats.processed, 0);
        assert_eq!(stats.errors, 1);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let mut janitor = Janitor::new(JanitorConfig {
            page_size: 0,
            ..Default::default()
        });
        let result = janitor
            .parse_backlog(&offline_parser(), &mut MockStore::default())
            .await;
        assert!(matches!(result, Err(JanitorError::Config(_))));
    }

    #[tokio::test]
    async fn test_fallback_rows_are_counted() {
        let mut store = MockStore::default();
        let id = store.add("north of the metroplex", Some("TX"));
        let parser = LocationParser::new(
            MockProvider::new(r#"[{"city": "Frisco", "state_code": "TX"}]"#),
            Arc::new(gazetteer()),
            ParserConfig::default(),
        );

        let stats = backlog_janitor().parse_backlog(&parser, &mut store).await.unwrap();
        assert_eq!(stats.fallback_calls, 1);
        assert_eq!(store.get(id).location.city.as_deref(), Some("Frisco"));
    }

    fn located(raw: &str, status: AvailabilityStatus, date: u64, location: LocationFact) -> TerritoryCheck {
        TerritoryCheck::new("f1", raw, status, Some(date)).with_location(location)
    }

    fn dedup_store() -> (MockStore, CheckId, CheckId) {
        let zip = located(
            "46077",
            AvailabilityStatus::NotAvailable,
            15,
            LocationFact {
                postal_code: Some("46077".to_string()),
                county: Some("Marion".to_string()),
                state_code: Some("IN".to_string()),
                ..LocationFact::empty()
            },
        );
        let indy = located(
            "Indianapolis, IN",
            AvailabilityStatus::NotAvailable,
            19,
            LocationFact {
                city: Some("Indianapolis".to_string()),
                county: Some("Marion".to_string()),
                state_code: Some("IN".to_string()),
                ..LocationFact::empty()
            },
        );
        let mut lone = located("Tulsa, OK", AvailabilityStatus::Available, 1, LocationFact::empty());
        lone.franchise_id = "f2".to_string();

        let ids = (zip.id, indy.id);
        let store = MockStore {
            checks: vec![zip, indy, lone],
            ..Default::default()
        };
        (store, ids.0, ids.1)
    }

    #[test]
    fn test_dedup_sweep_deletes_redundant_rows() {
        let (mut store, zip, indy) = dedup_store();
        let engine = DedupEngine::new(DedupConfig::default());

        let stats = Janitor::default_config()
            .dedup_sweep(&engine, &mut store, None)
            .unwrap();

        assert_eq!(stats.franchises, 1);
        assert_eq!(stats.processed, 2);
        assert_eq!(stats.deleted, 1);
        assert!(store.checks.iter().all(|c| c.id != zip));
        assert!(store.checks.iter().any(|c| c.id == indy));
    }

    #[test]
    fn test_dedup_sweep_dry_run_and_targeting() {
        let (mut store, _, _) = dedup_store();
        let engine = DedupEngine::new(DedupConfig::default());
        let mut janitor = Janitor::new(JanitorConfig {
            dry_run: true,
            ..Default::default()
        });

        let stats = janitor.dedup_sweep(&engine, &mut store, Some("f1")).unwrap();
        assert_eq!(stats.deleted, 1);
        assert_eq!(store.checks.len(), 3);

        let stats = janitor.dedup_sweep(&engine, &mut store, Some("f2")).unwrap();
        assert_eq!(stats.deleted, 0);
        assert_eq!(janitor.totals().franchises, 2);
    }

    #[test]
    fn test_dedup_sweep_counts_delete_failure() {
        let (mut store, _, _) = dedup_store();
        store.fail_writes = true;
        let engine = DedupEngine::new(DedupConfig::default());

        let stats = Janitor::default_config()
            .dedup_sweep(&engine, &mut store, None)
            .unwrap();
        assert_eq!(stats.deleted, 0);
        assert_eq!(stats.errors, 1);
        assert_eq!(store.checks.len(), 3);
    }

    #[test]
    fn test_dedup_sweep_moves_past_unreadable_franchise() {
        let (mut store, zip, indy) = dedup_store();
        for raw in ["Reno, NV", "Sparks, NV"] {
            let mut check = located(raw, AvailabilityStatus::Available, 1, LocationFact::empty());
            check.franchise_id = "a0".to_string();
            store.checks.push(check);
        }
        store.unreadable_franchise = Some("a0".to_string());
        let engine = DedupEngine::new(DedupConfig::default());

        let stats = Janitor::default_config()
            .dedup_sweep(&engine, &mut store, None)
            .unwrap();

        assert_eq!(stats.errors, 1);
        assert_eq!(stats.franchises, 1);
        assert_eq!(stats.deleted, 1);
        assert!(store.checks.iter().all(|c| c.id != zip));
        assert!(store.checks.iter().any(|c| c.id == indy));
    }

    #[test]
    fn test_enrich_backlog_fills_only_nulls() {
        let mut store = MockStore::default();
        let known = located(
            "94551",
            AvailabilityStatus::Available,
            1,
            LocationFact {
                postal_code: Some("94551".to_string()),
                state_code: Some("CA".to_string()),
                county: Some("Alameda County".to_string()),
                ..LocationFact::empty()
            },
        );
        let unknown = located(
            "10001",
            AvailabilityStatus::Available,
            1,
            LocationFact {
                postal_code: Some("10001".to_string()),
                ..LocationFact::empty()
            },
        );
        let (known_id, unknown_id) = (known.id, unknown.id);
        store.checks = vec![known, unknown];

        let mut janitor = Janitor::new(JanitorConfig::backlog());
        let stats = janitor.enrich_backlog(&gazetteer(), &mut store).unwrap();

        assert_eq!(stats.processed, 2);
        assert_eq!(stats.enriched, 1);
        assert_eq!(stats.unchanged, 1);

        let location = &store.get(known_id).location;
        assert_eq!(location.city.as_deref(), Some("Livermore"));
        assert_eq!(location.county.as_deref(), Some("Alameda County"));
        assert_eq!(location.latitude, Some(37.68));
        assert!(store.get(unknown_id).location.city.is_none());
    }
}
