//! Gazetteer enrichment of parsed facts

use territory_domain::location::is_all_digits;
use territory_domain::{Gazetteer, LocationFact};
use tracing::debug;

/// Fill still-null city, county, state and coordinates from the gazetteer
///
/// Fields already populated are never overwritten. Returns `true` when at
/// least one field was filled.
pub fn enrich(fact: &mut LocationFact, gazetteer: &dyn Gazetteer) -> bool {
    let Some(postal_code) = fact.postal_code.as_deref() else {
        return false;
    };
    let Some(record) = gazetteer.lookup(postal_code, &fact.country) else {
        debug!("Gazetteer miss for {} {}", fact.country, postal_code);
        return false;
    };

    let mut filled = false;
    let mut fill = |slot: &mut Option<String>, value: Option<String>| {
        if slot.is_none() {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                *slot = Some(value);
                filled = true;
            }
        }
    };
    fill(&mut fact.city, record.city.filter(|c| !is_all_digits(c.trim())));
    fill(&mut fact.county, record.county);
    fill(&mut fact.state_code, record.state_code);

    if fact.latitude.is_none() && record.latitude.is_some() {
        fact.latitude = record.latitude;
        filled = true;
    }
    if fact.longitude.is_none() && record.longitude.is_some() {
        fact.longitude = record.longitude;
        filled = true;
    }

    fact.sanitize();
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use territory_domain::{PostalRecord, StaticGazetteer};

    fn gazetteer() -> StaticGazetteer {
        StaticGazetteer::new()
            .with_record(PostalRecord {
                postal_code: "94551".to_string(),
                country: "US".to_string(),
                city: Some("Livermore".to_string()),
                county: Some("Alameda".to_string()),
                state_code: Some("CA".to_string()),
                latitude: Some(37.68),
                longitude: Some(-121.76),
            })
            .with_record(PostalRecord {
                postal_code: "99999".to_string(),
                country: "US".to_string(),
                city: Some("99999".to_string()),
                county: None,
                state_code: Some("AK".to_string()),
                latitude: None,
                longitude: None,
            })
    }

    #[test]
    fn test_fills_missing_fields() {
        let mut fact = LocationFact {
            postal_code: Some("94551".to_string()),
            ..LocationFact::empty()
        };
        assert!(enrich(&mut fact, &gazetteer()));
        assert_eq!(fact.city.as_deref(), Some("Livermore"));
        assert_eq!(fact.county.as_deref(), Some("Alameda"));
        assert_eq!(fact.state_code.as_deref(), Some("CA"));
        assert_eq!(fact.latitude, Some(37.68));
    }

    #[test]
    fn test_never_overwrites() {
        let mut fact = LocationFact {
            city: Some("Springtown".to_string()),
            state_code: Some("CA".to_string()),
            postal_code: Some("94551".to_string()),
            ..LocationFact::empty()
        };
        enrich(&mut fact, &gazetteer());
        assert_eq!(fact.city.as_deref(), Some("Springtown"));
        assert_eq!(fact.county.as_deref(), Some("Alameda"));
    }

    #[test]
    fn test_digit_city_from_gazetteer_rejected() {
        let mut fact = LocationFact {
            postal_code: Some("99999".to_string()),
            ..LocationFact::empty()
        };
        enrich(&mut fact, &gazetteer());
        assert_eq!(fact.city, None);
        assert_eq!(fact.state_code.as_deref(), Some("AK"));
    }

    #[test]
    fn test_miss_and_no_postal() {
        let mut fact = LocationFact {
            postal_code: Some("10001".to_string()),
            ..LocationFact::empty()
        };
        assert!(!enrich(&mut fact, &gazetteer()));

        let mut fact = LocationFact {
            city: Some("Reno".to_string()),
            ..LocationFact::empty()
        };
        assert!(!enrich(&mut fact, &gazetteer()));
    }
}
