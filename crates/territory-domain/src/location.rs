//! Location facts - the structured output of parsing one clause

/// Default country when no other indicator is present
pub const DEFAULT_COUNTRY: &str = "US";

/// One structured place reference parsed from a clause of broker text
///
/// A fact is only meaningful when [`LocationFact::has_geography`] holds; the
/// parser discards anything else as unparseable.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationFact {
    /// ISO 3166-1 alpha-2 country code
    pub country: String,

    /// Two-letter state or province code
    pub state_code: Option<String>,

    /// County name without the trailing "County" token (US only)
    pub county: Option<String>,

    /// City name, never a digits-only string
    pub city: Option<String>,

    /// US 5-digit ZIP or Canadian `A1A 1A1` code
    pub postal_code: Option<String>,

    /// Radius around the place, in miles
    pub radius_miles: Option<f64>,

    /// Territory is being re-offered after a franchisee exit
    pub is_resale: bool,

    /// Latitude from the gazetteer
    pub latitude: Option<f64>,

    /// Longitude from the gazetteer
    pub longitude: Option<f64>,
}

impl Default for LocationFact {
    fn default() -> Self {
        Self::empty()
    }
}

impl LocationFact {
    /// A fact with no geography in the default country
    pub fn empty() -> Self {
        Self {
            country: DEFAULT_COUNTRY.to_string(),
            state_code: None,
            county: None,
            city: None,
            postal_code: None,
            radius_miles: None,
            is_resale: false,
            latitude: None,
            longitude: None,
        }
    }

    /// True when at least one of state, county, city or postal code is set
    pub fn has_geography(&self) -> bool {
        self.state_code.is_some()
            || self.county.is_some()
            || self.city.is_some()
            || self.postal_code.is_some()
    }

    /// Enforce field invariants in place
    ///
    /// - empty strings become `None`
    /// - a digits-only city is rejected (it is a misread postal code)
    /// - state codes are uppercased, anything not two ASCII letters is dropped
    /// - county is cleared outside the US
    /// - negative or non-finite radius is dropped
    pub fn sanitize(&mut self) {
        self.country = normalize_country(&self.country);
        self.city = clean_text(self.city.take()).filter(|c| !is_all_digits(c));
        self.county = clean_text(self.county.take());
        self.postal_code = clean_text(self.postal_code.take());
        self.state_code = clean_text(self.state_code.take())
            .map(|s| s.to_ascii_uppercase())
            .filter(|s| s.len() == 2 && s.chars().all(|c| c.is_ascii_alphabetic()));
        if self.country != DEFAULT_COUNTRY {
            self.county = None;
        }
        self.radius_miles = self.radius_miles.filter(|r| r.is_finite() && *r >= 0.0);
        self.latitude = self.latitude.filter(|v| v.is_finite());
        self.longitude = self.longitude.filter(|v| v.is_finite());
    }

    /// Sanitize and return `None` when nothing geographic survives
    pub fn validated(mut self) -> Option<Self> {
        self.sanitize();
        self.has_geography().then_some(self)
    }

    /// Human-readable single-line rendering, e.g. `Livermore, CA 94551 (+25 mi)`
    pub fn display_name(&self) -> String {
        let mut parts = Vec::new();
        if let Some(city) = &self.city {
            parts.push(city.clone());
        }
        if let Some(county) = &self.county {
            parts.push(format!("{} County", county));
        }
        let mut tail = Vec::new();
        if let Some(state) = &self.state_code {
            tail.push(state.clone());
        }
        if let Some(postal) = &self.postal_code {
            tail.push(postal.clone());
        }
        if !tail.is_empty() {
            parts.push(tail.join(" "));
        }
        let mut out = parts.join(", ");
        if self.country != DEFAULT_COUNTRY {
            out.push_str(&format!(" [{}]", self.country));
        }
        if let Some(radius) = self.radius_miles {
            out.push_str(&format!(" (+{} mi)", radius));
        }
        if self.is_resale {
            out.push_str(" resale");
        }
        out
    }
}

/// True for non-empty strings made only of ASCII digits
pub fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|v| !v.is_empty())
}

fn normalize_country(country: &str) -> String {
    let trimmed = country.trim();
    if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        trimmed.to_ascii_uppercase()
    } else {
        DEFAULT_COUNTRY.to_string()
    }
}
