//! Deduplication decisions over one or more franchises' checks

use crate::config::DedupConfig;
use crate::scope::{is_contained, normalize_name, Scope};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use territory_domain::{AvailabilityStatus, CheckId, Gazetteer, TerritoryCheck};
use tracing::{debug, info};

/// Why a check was deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupReason {
    /// Same raw text as a newer check
    ExactDuplicate,

    /// Same place and status as a newer check
    SamePlaceNewer,

    /// A newer check with a different status covers the broader area
    BroaderStatusNewer,

    /// A broader "Not Available" check dated no earlier makes it redundant
    CoveredByNotAvailable,

    /// A contained "Available" check dated no earlier supersedes the broader one
    SupersededBySpecific,
}

impl DedupReason {
    /// Short label for logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            DedupReason::ExactDuplicate => "exact_duplicate",
            DedupReason::SamePlaceNewer => "same_place_newer",
            DedupReason::BroaderStatusNewer => "broader_status_newer",
            DedupReason::CoveredByNotAvailable => "covered_by_not_available",
            DedupReason::SupersededBySpecific => "superseded_by_specific",
        }
    }
}

/// One deletion and the check that made it redundant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupDecision {
    /// Check to delete
    pub deleted: CheckId,

    /// Check that stays and covers it
    pub superseded_by: CheckId,

    /// Rule that fired
    pub reason: DedupReason,
}

/// A pair the engine could not decide between
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPair {
    /// First check of the pair, in input order
    pub first: CheckId,

    /// Second check of the pair
    pub second: CheckId,
}

/// Result of a dedup run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupOutcome {
    /// Checks that survive
    pub keep_ids: BTreeSet<CheckId>,

    /// Checks to remove
    pub delete_ids: BTreeSet<CheckId>,

    /// One entry per deleted check
    pub decisions: Vec<DedupDecision>,

    /// Undecidable pairs left for a human
    pub review: Vec<ReviewPair>,
}

impl DedupOutcome {
    fn delete(&mut self, deleted: CheckId, superseded_by: CheckId, reason: DedupReason) {
        if self.delete_ids.insert(deleted) {
            debug!("Deleting {} ({}), covered by {}", deleted, reason.as_str(), superseded_by);
            self.decisions.push(DedupDecision {
                deleted,
                superseded_by,
                reason,
            });
        }
    }
}

/// Outcome of comparing one pair in the hierarchy stage
enum Verdict {
    Delete {
        loser: usize,
        winner: usize,
        reason: DedupReason,
    },
    Review,
    Ignore,
}

/// The dedup engine reduces checks to a non-redundant set
pub struct DedupEngine {
    config: DedupConfig,
    gazetteer: Option<Arc<dyn Gazetteer + Send + Sync>>,
}

impl DedupEngine {
    /// Create an engine without gazetteer resolution
    pub fn new(config: DedupConfig) -> Self {
        Self {
            config,
            gazetteer: None,
        }
    }

    /// Resolve postal-code-only checks through `gazetteer` before comparing
    pub fn with_gazetteer(mut self, gazetteer: Arc<dyn Gazetteer + Send + Sync>) -> Self {
        self.gazetteer = Some(gazetteer);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// Decide which checks to keep and which to delete
    ///
    /// Checks are grouped by franchise; checks of different franchises never
    /// interact. Input order decides the order pairs are visited in.
    pub fn dedupe(&self, checks: &[TerritoryCheck]) -> DedupOutcome {
        let mut by_franchise: BTreeMap<&str, Vec<&TerritoryCheck>> = BTreeMap::new();
        for check in checks {
            by_franchise
                .entry(check.franchise_id.as_str())
                .or_default()
                .push(check);
        }

        let mut outcome = DedupOutcome::default();
        for (franchise, group) in &by_franchise {
            if group.len() > 1 {
                self.dedupe_franchise(franchise, group, &mut outcome);
            }
        }

        outcome.keep_ids = checks
            .iter()
            .map(|c| c.id)
            .filter(|id| !outcome.delete_ids.contains(id))
            .collect();

        info!(
            "Dedup: {} checks, {} kept, {} deleted, {} for review",
            checks.len(),
            outcome.keep_ids.len(),
            outcome.delete_ids.len(),
            outcome.review.len()
        );
        outcome
    }

    fn dedupe_franchise(&self, franchise: &str, checks: &[&TerritoryCheck], outcome: &mut DedupOutcome) {
        let before = outcome.delete_ids.len();

        if self.config.exact_duplicates {
            exact_duplicates(checks, outcome);
        }
        if self.config.hierarchy {
            self.hierarchy(checks, outcome);
        }

        debug!(
            "Franchise {}: {} of {} checks removed",
            franchise,
            outcome.delete_ids.len() - before,
            checks.len()
        );
    }

    fn hierarchy(&self, checks: &[&TerritoryCheck], outcome: &mut DedupOutcome) {
        let gazetteer = if self.config.resolve_postal_codes {
            self.gazetteer.as_deref().map(|g| g as &dyn Gazetteer)
        } else {
            None
        };
        let scopes: Vec<Option<Scope>> = checks
            .iter()
            .map(|c| Scope::resolve(&c.location, gazetteer))
            .collect();

        for i in 0..checks.len() {
            for j in (i + 1)..checks.len() {
                if outcome.delete_ids.contains(&checks[i].id) {
                    break;
                }
                if outcome.delete_ids.contains(&checks[j].id) {
                    continue;
                }
                let (Some(a), Some(b)) = (&scopes[i], &scopes[j]) else {
                    continue;
                };

                match compare(i, a, checks[i], j, b, checks[j]) {
                    Verdict::Delete { loser, winner, reason } => {
                        outcome.delete(checks[loser].id, checks[winner].id, reason);
                    }
                    Verdict::Review => {
                        debug!("No decision between {} and {}", checks[i].id, checks[j].id);
                        outcome.review.push(ReviewPair {
                            first: checks[i].id,
                            second: checks[j].id,
                        });
                    }
                    Verdict::Ignore => {}
                }
            }
        }
    }
}

/// Grouping key for exact duplicates: normalized raw text and geography
///
/// Rows split from one statement share the raw text but differ in geography,
/// so they never collapse into each other.
fn exact_key(check: &TerritoryCheck) -> (String, String) {
    let location = &check.location;
    let field = |value: &Option<String>| value.as_deref().map(normalize_name).unwrap_or_default();
    let geography = [
        location.country.to_ascii_lowercase(),
        field(&location.state_code),
        field(&location.county),
        field(&location.city),
        field(&location.postal_code),
    ]
    .join("|");
    (check.normalized_raw(), geography)
}

/// Keep the newest check per exact key
///
/// A missing date counts as oldest; equal dates go to the greater id.
fn exact_duplicates(checks: &[&TerritoryCheck], outcome: &mut DedupOutcome) {
    let mut groups: BTreeMap<(String, String), Vec<&TerritoryCheck>> = BTreeMap::new();
    for &check in checks {
        groups.entry(exact_key(check)).or_default().push(check);
    }

    for group in groups.values().filter(|g| g.len() > 1) {
        let Some(survivor) = group.iter().max_by_key(|c| (c.check_date, c.id)) else {
            continue;
        };
        for check in group.iter().filter(|c| c.id != survivor.id) {
            outcome.delete(check.id, survivor.id, DedupReason::ExactDuplicate);
        }
    }
}

fn compare(
    i: usize,
    a: &Scope,
    check_a: &TerritoryCheck,
    j: usize,
    b: &Scope,
    check_b: &TerritoryCheck,
) -> Verdict {
    use AvailabilityStatus::*;

    if a.level() == b.level() {
        if a != b || check_a.availability_status != check_b.availability_status {
            return Verdict::Ignore;
        }
        return match newer(check_a.check_date, check_b.check_date) {
            Some(true) => Verdict::Delete {
                loser: j,
                winner: i,
                reason: DedupReason::SamePlaceNewer,
            },
            Some(false) => Verdict::Delete {
                loser: i,
                winner: j,
                reason: DedupReason::SamePlaceNewer,
            },
            None => Verdict::Review,
        };
    }

    let ((s, specific_scope, specific), (w, broader_scope, broader)) = if a.level() < b.level() {
        ((i, a, check_a), (j, b, check_b))
    } else {
        ((j, b, check_b), (i, a, check_a))
    };

    if !is_contained(specific_scope, broader_scope) {
        return Verdict::Ignore;
    }

    let status = (specific.availability_status, broader.availability_status);
    if !status.0.is_definite() || !status.1.is_definite() {
        return Verdict::Ignore;
    }

    let (specific_date, broader_date) = (specific.check_date, broader.check_date);
    if specific_date.is_none() && broader_date.is_none() {
        return Verdict::Review;
    }

    match status {
        (NotAvailable, NotAvailable) if broader_date >= specific_date => Verdict::Delete {
            loser: s,
            winner: w,
            reason: DedupReason::CoveredByNotAvailable,
        },
        (Available, Available) if specific_date >= broader_date => Verdict::Delete {
            loser: w,
            winner: s,
            reason: DedupReason::SupersededBySpecific,
        },
        (x, y) if x != y && broader_date > specific_date => Verdict::Delete {
            loser: s,
            winner: w,
            reason: DedupReason::BroaderStatusNewer,
        },
        _ => Verdict::Ignore,
    }
}

/// `Some(true)` when the first date is strictly newer, `None` on a tie
fn newer(a: Option<u64>, b: Option<u64>) -> Option<bool> {
    match a.cmp(&b) {
        std::cmp::Ordering::Greater => Some(true),
        std::cmp::Ordering::Less => Some(false),
        std::cmp::Ordering::Equal => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use territory_domain::{LocationFact, PostalRecord, StaticGazetteer};

    const NOV_14: u64 = 1_731_542_400;
    const NOV_15: u64 = NOV_14 + 86_400;
    const NOV_19: u64 = NOV_14 + 5 * 86_400;
    const NOV_23: u64 = NOV_14 + 9 * 86_400;

    fn check(raw: &str, status: AvailabilityStatus, date: Option<u64>, location: LocationFact) -> TerritoryCheck {
        TerritoryCheck::new("franchise-1", raw, status, date).with_location(location)
    }

    fn place(state: &str, county: Option<&str>, city: Option<&str>, postal: Option<&str>) -> LocationFact {
        LocationFact {
            state_code: Some(state.to_string()),
            county: county.map(String::from),
            city: city.map(String::from),
            postal_code: postal.map(String::from),
            ..LocationFact::empty()
        }
    }

    fn engine() -> DedupEngine {
        DedupEngine::new(DedupConfig::default())
    }

    #[test]
    fn test_broader_not_available_newer_removes_postal_code() {
        let zip = check(
            "46077",
            AvailabilityStatus::NotAvailable,
            Some(NOV_15),
            place("IN", Some("Marion"), None, Some("46077")),
        );
        let indy = check(
            "Indianapolis, IN",
            AvailabilityStatus::NotAvailable,
            Some(NOV_19),
            place("IN", Some("Marion"), Some("Indianapolis"), None),
        );

        let outcome = engine().dedupe(&[zip.clone(), indy.clone()]);
        assert_eq!(outcome.delete_ids, BTreeSet::from([zip.id]));
        assert_eq!(outcome.keep_ids, BTreeSet::from([indy.id]));
        assert_eq!(outcome.decisions[0].reason, DedupReason::CoveredByNotAvailable);
        assert_eq!(outcome.decisions[0].superseded_by, indy.id);
    }

    #[test]
    fn test_newer_available_postal_code_supersedes_city() {
        let zip = check(
            "46077",
            AvailabilityStatus::Available,
            Some(NOV_19),
            place("IN", Some("Marion"), None, Some("46077")),
        );
        let indy = check(
            "Indianapolis, IN",
            AvailabilityStatus::Available,
            Some(NOV_15),
            place("IN", Some("Marion"), Some("Indianapolis"), None),
        );

        let outcome = engine().dedupe(&[zip.clone(), indy.clone()]);
        assert_eq!(outcome.keep_ids, BTreeSet::from([zip.id]));
        assert_eq!(outcome.delete_ids, BTreeSet::from([indy.id]));
        assert_eq!(outcome.decisions[0].reason, DedupReason::SupersededBySpecific);
    }

    #[test]
    fn test_exact_duplicates_keep_newest() {
        let oakland = place("CA", None, Some("Oakland"), None);
        let first = check("Oakland, CA", AvailabilityStatus::Available, Some(NOV_14), oakland.clone());
        let second = check("Oakland, CA", AvailabilityStatus::Available, Some(NOV_14), oakland.clone());
        let latest = check("Oakland, CA", AvailabilityStatus::Available, Some(NOV_23), oakland);

        let outcome = engine().dedupe(&[first.clone(), second.clone(), latest.clone()]);
        assert_eq!(outcome.keep_ids, BTreeSet::from([latest.id]));
        assert_eq!(outcome.delete_ids, BTreeSet::from([first.id, second.id]));
        assert!(outcome
            .decisions
            .iter()
            .all(|d| d.reason == DedupReason::ExactDuplicate && d.superseded_by == latest.id));
    }

    #[test]
    fn test_exact_duplicate_tie_goes_to_greater_id() {
        let a = check("Tulsa, OK", AvailabilityStatus::Available, None, LocationFact::empty());
        let b = check(" tulsa,  OK", AvailabilityStatus::Available, None, LocationFact::empty());
        let newer_id = a.id.max(b.id);

        let outcome = engine().dedupe(&[a.clone(), b.clone()]);
        assert_eq!(outcome.keep_ids, BTreeSet::from([newer_id]));
    }

    #[test]
    fn test_split_siblings_are_not_exact_duplicates() {
        let raw = "Dallas or Amarillo, TX";
        let dallas = check(raw, AvailabilityStatus::Available, Some(NOV_14), place("TX", None, Some("Dallas"), None));
        let amarillo = dallas.split_sibling(place("TX", None, Some("Amarillo"), None));

        let outcome = engine().dedupe(&[dallas, amarillo]);
        assert!(outcome.delete_ids.is_empty());
        assert_eq!(outcome.keep_ids.len(), 2);
    }

    #[test]
    fn test_status_change_newer_specific_keeps_both() {
        let zip = check(
            "94551",
            AvailabilityStatus::Available,
            Some(NOV_23),
            place("CA", Some("Alameda"), Some("Livermore"), Some("94551")),
        );
        let county = check(
            "Alameda County",
            AvailabilityStatus::NotAvailable,
            Some(NOV_14),
            place("CA", Some("Alameda"), None, None),
        );

        let outcome = engine().dedupe(&[zip, county]);
        assert!(outcome.delete_ids.is_empty());
        assert_eq!(outcome.keep_ids.len(), 2);
    }

    #[test]
    fn test_status_change_newer_broader_wins() {
        let zip = check(
            "94551",
            AvailabilityStatus::Available,
            Some(NOV_14),
            place("CA", Some("Alameda"), Some("Livermore"), Some("94551")),
        );
        let state = check("California", AvailabilityStatus::NotAvailable, Some(NOV_23), place("CA", None, None, None));

        let outcome = engine().dedupe(&[zip.clone(), state]);
        assert_eq!(outcome.delete_ids, BTreeSet::from([zip.id]));
        assert_eq!(outcome.decisions[0].reason, DedupReason::BroaderStatusNewer);
    }

    #[test]
    fn test_pending_never_deletes_across_levels() {
        let city = check(
            "Plano, TX",
            AvailabilityStatus::Pending,
            Some(NOV_14),
            place("TX", Some("Collin"), Some("Plano"), None),
        );
        let state = check("Texas", AvailabilityStatus::NotAvailable, Some(NOV_23), place("TX", None, None, None));

        let outcome = engine().dedupe(&[city, state]);
        assert!(outcome.delete_ids.is_empty());
    }

    #[test]
    fn test_undated_contained_pair_goes_to_review() {
        let city = check(
            "Plano, TX",
            AvailabilityStatus::NotAvailable,
            None,
            place("TX", Some("Collin"), Some("Plano"), None),
        );
        let county = check("Collin County", AvailabilityStatus::NotAvailable, None, place("TX", Some("Collin"), None, None));

        let outcome = engine().dedupe(&[city.clone(), county.clone()]);
        assert!(outcome.delete_ids.is_empty());
        assert_eq!(
            outcome.review,
            vec![ReviewPair {
                first: city.id,
                second: county.id
            }]
        );
    }

    #[test]
    fn test_same_place_newer_wins_and_tie_is_reviewed() {
        let plano = place("TX", Some("Collin"), Some("Plano"), None);
        let old = check("Plano TX", AvailabilityStatus::Available, Some(NOV_14), plano.clone());
        let new = check("Plano, Texas", AvailabilityStatus::Available, Some(NOV_19), plano.clone());
        let outcome = engine().dedupe(&[old.clone(), new.clone()]);
        assert_eq!(outcome.delete_ids, BTreeSet::from([old.id]));
        assert_eq!(outcome.decisions[0].reason, DedupReason::SamePlaceNewer);

        let same_day = check("plano", AvailabilityStatus::Available, Some(NOV_19), plano);
        let outcome = engine().dedupe(&[new, same_day]);
        assert!(outcome.delete_ids.is_empty());
        assert_eq!(outcome.review.len(), 1);
    }

    #[test]
    fn test_different_states_never_interact() {
        let city = check(
            "Portland, ME",
            AvailabilityStatus::NotAvailable,
            Some(NOV_14),
            place("ME", Some("Cumberland"), Some("Portland"), None),
        );
        let state = check("Oregon", AvailabilityStatus::NotAvailable, Some(NOV_23), place("OR", None, None, None));

        assert!(engine().dedupe(&[city, state]).delete_ids.is_empty());
    }

    #[test]
    fn test_franchises_are_separate() {
        let a = check("Oakland, CA", AvailabilityStatus::Available, Some(NOV_14), LocationFact::empty());
        let mut b = check("Oakland, CA", AvailabilityStatus::Available, Some(NOV_23), LocationFact::empty());
        b.franchise_id = "franchise-2".to_string();

        let outcome = engine().dedupe(&[a, b]);
        assert!(outcome.delete_ids.is_empty());
        assert_eq!(outcome.keep_ids.len(), 2);
    }

    #[test]
    fn test_gazetteer_resolution_enables_containment() {
        let gazetteer = StaticGazetteer::new().with_record(PostalRecord {
            postal_code: "94551".to_string(),
            country: "US".to_string(),
            city: Some("Livermore".to_string()),
            county: Some("Alameda".to_string()),
            state_code: Some("CA".to_string()),
            latitude: None,
            longitude: None,
        });
        let zip = check(
            "94551",
            AvailabilityStatus::NotAvailable,
            Some(NOV_14),
            LocationFact {
                postal_code: Some("94551".to_string()),
                ..LocationFact::empty()
            },
        );
        let city = check(
            "Livermore, CA",
            AvailabilityStatus::NotAvailable,
            Some(NOV_19),
            place("CA", None, Some("Livermore"), None),
        );
        let checks = [zip.clone(), city];

        assert!(engine().dedupe(&checks).delete_ids.is_empty());

        let resolving = engine().with_gazetteer(Arc::new(gazetteer));
        assert_eq!(resolving.dedupe(&checks).delete_ids, BTreeSet::from([zip.id]));

        let exact_only = DedupEngine::new(DedupConfig::exact_only());
        assert!(exact_only.dedupe(&checks).delete_ids.is_empty());
    }

    #[test]
    fn test_rerun_changes_nothing() {
        let checks = vec![
            check("46077", AvailabilityStatus::NotAvailable, Some(NOV_15), place("IN", Some("Marion"), None, Some("46077"))),
            check("Indianapolis", AvailabilityStatus::NotAvailable, Some(NOV_19), place("IN", Some("Marion"), Some("Indianapolis"), None)),
            check("Indiana", AvailabilityStatus::Available, Some(NOV_23), place("IN", None, None, None)),
            check("indiana", AvailabilityStatus::Available, Some(NOV_14), place("IN", None, None, None)),
        ];

        let first = engine().dedupe(&checks);
        let survivors: Vec<TerritoryCheck> = checks
            .iter()
            .filter(|c| first.keep_ids.contains(&c.id))
            .cloned()
            .collect();
        let second = engine().dedupe(&survivors);
        assert!(second.delete_ids.is_empty());
        assert_eq!(second.keep_ids, first.keep_ids);
    }

    fn arb_check() -> impl Strategy<Value = TerritoryCheck> {
        let status = prop_oneof![
            Just(AvailabilityStatus::Available),
            Just(AvailabilityStatus::NotAvailable),
            Just(AvailabilityStatus::Pending),
        ];
        (
            0..4usize,
            status,
            proptest::option::of(0u64..5),
            prop::sample::select(vec!["IN", "CA"]),
            proptest::option::of(prop::sample::select(vec!["Marion", "Alameda"])),
            proptest::option::of(prop::sample::select(vec!["Indianapolis", "Livermore"])),
            proptest::option::of(prop::sample::select(vec!["46077", "94551"])),
        )
            .prop_map(|(raw, status, date, state, county, city, postal)| {
                check(&format!("place {}", raw), status, date, place(state, county, city, postal))
            })
    }

    proptest! {
        #[test]
        fn prop_partition_and_stability(checks in prop::collection::vec(arb_check(), 0..8)) {
            let outcome = engine().dedupe(&checks);

            prop_assert_eq!(outcome.keep_ids.len() + outcome.delete_ids.len(), checks.len());
            prop_assert!(outcome.keep_ids.is_disjoint(&outcome.delete_ids));
            prop_assert_eq!(outcome.decisions.len(), outcome.delete_ids.len());
            for decision in &outcome.decisions {
                prop_assert!(outcome.keep_ids.contains(&decision.superseded_by)
                    || outcome.delete_ids.contains(&decision.superseded_by));
            }

            let survivors: Vec<TerritoryCheck> = checks
                .iter()
                .filter(|c| outcome.keep_ids.contains(&c.id))
                .cloned()
                .collect();
            prop_assert!(engine().dedupe(&survivors).delete_ids.is_empty());
        }
    }
}
