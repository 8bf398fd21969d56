//! Postal-code gazetteer contract
//!
//! A gazetteer resolves a postal code to its canonical city, county, state and
//! coordinates. Lookups are deterministic and never fatal: any backend failure
//! is reported as "not found".

use std::collections::HashMap;

/// One row of the postal-code reference dataset
#[derive(Debug, Clone, PartialEq)]
pub struct PostalRecord {
    /// Normalized postal code
    pub postal_code: String,

    /// ISO alpha-2 country code
    pub country: String,

    /// Primary city for the code
    pub city: Option<String>,

    /// County (US only)
    pub county: Option<String>,

    /// State or province code
    pub state_code: Option<String>,

    /// Latitude of the code centroid
    pub latitude: Option<f64>,

    /// Longitude of the code centroid
    pub longitude: Option<f64>,
}

/// Postal-code lookup
///
/// Implemented by the in-memory [`StaticGazetteer`] and by the SQLite-backed
/// gazetteer in `territory-store`.
pub trait Gazetteer {
    /// Resolve a postal code; `None` when unknown or on backend failure
    fn lookup(&self, postal_code: &str, country: &str) -> Option<PostalRecord>;
}

/// Normalize a postal code for the given country
///
/// - US: first five digits (`94551-1234` becomes `94551`)
/// - CA: uppercase `A1A 1A1`, accepting an embedded space or hyphen
///
/// Returns `None` when the code does not fit the country's shape.
///
/// # Examples
///
/// ```
/// use territory_domain::normalize_postal_code;
///
/// assert_eq!(normalize_postal_code("94551-1234", "US").as_deref(), Some("94551"));
/// assert_eq!(normalize_postal_code("m5v-2t6", "CA").as_deref(), Some("M5V 2T6"));
/// assert_eq!(normalize_postal_code("9455", "US"), None);
/// ```
pub fn normalize_postal_code(code: &str, country: &str) -> Option<String> {
    let compact: String = code
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_ascii_uppercase();

    match country.trim().to_ascii_uppercase().as_str() {
        "CA" => {
            let chars: Vec<char> = compact.chars().collect();
            let shape_ok = chars.len() == 6
                && chars
                    .iter()
                    .enumerate()
                    .all(|(i, c)| if i % 2 == 0 { c.is_ascii_alphabetic() } else { c.is_ascii_digit() });
            shape_ok.then(|| format!("{} {}", &compact[..3], &compact[3..]))
        }
        _ => {
            let digits_ok = (compact.len() == 5 || compact.len() == 9)
                && compact.chars().all(|c| c.is_ascii_digit());
            digits_ok.then(|| compact[..5].to_string())
        }
    }
}

/// In-memory gazetteer keyed by (country, normalized postal code)
#[derive(Debug, Clone, Default)]
pub struct StaticGazetteer {
    records: HashMap<(String, String), PostalRecord>,
}

impl StaticGazetteer {
    /// Create an empty gazetteer
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, normalizing its postal code; malformed codes are ignored
    pub fn insert(&mut self, mut record: PostalRecord) {
        record.country = record.country.trim().to_ascii_uppercase();
        if let Some(code) = normalize_postal_code(&record.postal_code, &record.country) {
            record.postal_code = code.clone();
            self.records.insert((record.country.clone(), code), record);
        }
    }

    /// Builder-style insert
    pub fn with_record(mut self, record: PostalRecord) -> Self {
        self.insert(record);
        self
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records are loaded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Gazetteer for StaticGazetteer {
    fn lookup(&self, postal_code: &str, country: &str) -> Option<PostalRecord> {
        let country = country.trim().to_ascii_uppercase();
        let code = normalize_postal_code(postal_code, &country)?;
        self.records.get(&(country, code)).cloned()
    }
}
