//! Resolved geographic scope of a check and containment between scopes

use territory_domain::{Gazetteer, LocationFact, ScopeLevel};

/// Geography of a check at its most specific level
///
/// Names are kept in comparison form (see [`normalize_name`]). A check without
/// a state has no scope and never takes part in hierarchy rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// A single postal code
    PostalCode {
        /// State or province code
        state: String,
        /// Normalized postal code
        postal_code: String,
        /// City the code belongs to, when known
        city: Option<String>,
        /// County the code belongs to, when known
        county: Option<String>,
    },

    /// A city or town
    City {
        /// State or province code
        state: String,
        /// City name
        city: String,
        /// County the city lies in, when known
        county: Option<String>,
    },

    /// A county or parish
    County {
        /// State or province code
        state: String,
        /// County name without the "County" suffix
        county: String,
    },

    /// A whole state or province
    State {
        /// State or province code
        state: String,
    },
}

impl Scope {
    /// Build the scope of a fact, optionally filling gaps from the gazetteer
    ///
    /// The fact itself is never modified.
    pub fn resolve(fact: &LocationFact, gazetteer: Option<&dyn Gazetteer>) -> Option<Self> {
        let mut fact = fact.clone();

        if let (Some(gazetteer), Some(postal)) = (gazetteer, fact.postal_code.as_deref()) {
            let incomplete =
                fact.city.is_none() || fact.county.is_none() || fact.state_code.is_none();
            if incomplete {
                if let Some(record) = gazetteer.lookup(postal, &fact.country) {
                    fact.city = fact.city.or(record.city);
                    fact.county = fact.county.or(record.county);
                    fact.state_code = fact.state_code.or(record.state_code);
                }
            }
        }

        let state = fact.state_code.as_deref()?.trim().to_ascii_uppercase();
        let city = fact.city.as_deref().map(normalize_name);
        let county = fact.county.as_deref().map(normalize_name);

        let scope = match ScopeLevel::of(&fact)? {
            ScopeLevel::PostalCode => Scope::PostalCode {
                state,
                postal_code: fact.postal_code?.trim().to_ascii_uppercase(),
                city,
                county,
            },
            ScopeLevel::City => Scope::City {
                state,
                city: city?,
                county,
            },
            ScopeLevel::County => Scope::County {
                state,
                county: county?,
            },
            ScopeLevel::State => Scope::State { state },
        };
        Some(scope)
    }

    /// Specificity level
    pub fn level(&self) -> ScopeLevel {
        match self {
            Scope::PostalCode { .. } => ScopeLevel::PostalCode,
            Scope::City { .. } => ScopeLevel::City,
            Scope::County { .. } => ScopeLevel::County,
            Scope::State { .. } => ScopeLevel::State,
        }
    }

    /// State or province code
    pub fn state(&self) -> &str {
        match self {
            Scope::PostalCode { state, .. }
            | Scope::City { state, .. }
            | Scope::County { state, .. }
            | Scope::State { state } => state,
        }
    }

    fn county(&self) -> Option<&str> {
        match self {
            Scope::PostalCode { county, .. } | Scope::City { county, .. } => county.as_deref(),
            Scope::County { county, .. } => Some(county),
            Scope::State { .. } => None,
        }
    }

    fn city(&self) -> Option<&str> {
        match self {
            Scope::PostalCode { city, .. } => city.as_deref(),
            Scope::City { city, .. } => Some(city),
            _ => None,
        }
    }
}

/// Whether `specific` lies inside `broader`
///
/// Requires the same state. A postal code or city is inside a county when
/// their counties match; a postal code is inside a city when its city matches,
/// or, if the postal code has no known city, when both counties match.
/// Everything in a state is inside that state.
pub fn is_contained(specific: &Scope, broader: &Scope) -> bool {
    if specific.state() != broader.state() || specific.level() >= broader.level() {
        return false;
    }

    match broader {
        Scope::State { .. } => true,
        Scope::County { county, .. } => specific.county() == Some(county.as_str()),
        Scope::City { city, county, .. } => match specific.city() {
            Some(specific_city) => specific_city == city.as_str(),
            None => match (specific.county(), county.as_deref()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        },
        Scope::PostalCode { .. } => false,
    }
}

/// Comparison form of a place name
///
/// Lowercased, periods dropped, whitespace collapsed, a trailing
/// "county"/"parish" removed and "saint"/"st" unified.
///
/// ```
/// use territory_dedup::normalize_name;
///
/// assert_eq!(normalize_name("St. Louis County"), normalize_name("saint louis"));
/// ```
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase().replace('.', " ");
    let mut words: Vec<&str> = lowered.split_whitespace().collect();

    if words.len() > 1 && matches!(words.last(), Some(&"county") | Some(&"parish")) {
        words.pop();
    }

    words
        .into_iter()
        .map(|w| if w == "saint" { "st" } else { w })
        .collect::<Vec<_>>()
        .join(" ")
}
