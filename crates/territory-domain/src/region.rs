//! Region tables for US states and Canadian provinces

/// US states, DC and inhabited territories
pub const US_STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("PR", "Puerto Rico"),
    ("GU", "Guam"),
    ("VI", "Virgin Islands"),
];

/// Canadian provinces and territories
pub const CA_PROVINCES: &[(&str, &str)] = &[
    ("AB", "Alberta"),
    ("BC", "British Columbia"),
    ("MB", "Manitoba"),
    ("NB", "New Brunswick"),
    ("NL", "Newfoundland and Labrador"),
    ("NS", "Nova Scotia"),
    ("NT", "Northwest Territories"),
    ("NU", "Nunavut"),
    ("ON", "Ontario"),
    ("PE", "Prince Edward Island"),
    ("QC", "Quebec"),
    ("SK", "Saskatchewan"),
    ("YT", "Yukon"),
];

/// Country a region code or name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionCountry {
    /// United States
    Us,
    /// Canada
    Ca,
}

impl RegionCountry {
    /// ISO alpha-2 code
    pub fn iso_code(&self) -> &'static str {
        match self {
            RegionCountry::Us => "US",
            RegionCountry::Ca => "CA",
        }
    }
}

/// Look up a two-letter region code (case-insensitive)
///
/// "CA" resolves to California; Canada is only detected from province codes,
/// postal codes or the country name.
pub fn region_for_code(code: &str) -> Option<(&'static str, RegionCountry)> {
    let upper = code.trim().to_ascii_uppercase();
    if let Some((c, _)) = US_STATES.iter().find(|(c, _)| *c == upper) {
        return Some((*c, RegionCountry::Us));
    }
    CA_PROVINCES
        .iter()
        .find(|(c, _)| *c == upper)
        .map(|(c, _)| (*c, RegionCountry::Ca))
}

/// Look up a full region name (case-insensitive, also accepts "Newfoundland")
pub fn region_for_name(name: &str) -> Option<(&'static str, RegionCountry)> {
    let folded = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    if folded.is_empty() {
        return None;
    }
    if let Some((c, _)) = US_STATES.iter().find(|(_, n)| n.to_lowercase() == folded) {
        return Some((*c, RegionCountry::Us));
    }
    if folded == "newfoundland" || folded == "québec" {
        let code = if folded == "newfoundland" { "NL" } else { "QC" };
        return Some((code, RegionCountry::Ca));
    }
    CA_PROVINCES
        .iter()
        .find(|(_, n)| n.to_lowercase() == folded)
        .map(|(c, _)| (*c, RegionCountry::Ca))
}

/// All region names, longest first, for suffix matching in free text
pub fn region_names_longest_first() -> Vec<(&'static str, &'static str, RegionCountry)> {
    let mut names: Vec<_> = US_STATES
        .iter()
        .map(|(c, n)| (*n, *c, RegionCountry::Us))
        .chain(CA_PROVINCES.iter().map(|(c, n)| (*n, *c, RegionCountry::Ca)))
        .collect();
    names.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    names
}

/// Province implied by the first letter of a Canadian postal code
pub fn province_for_postal_prefix(postal_code: &str) -> Option<&'static str> {
    let first = postal_code.trim().chars().next()?.to_ascii_uppercase();
    let code = match first {
        'A' => "NL",
        'B' => "NS",
        'C' => "PE",
        'E' => "NB",
        'G' | 'H' | 'J' => "QC",
        'K' | 'L' | 'M' | 'N' | 'P' => "ON",
        'R' => "MB",
        'S' => "SK",
        'T' => "AB",
        'V' => "BC",
        'X' => "NT",
        'Y' => "YT",
        _ => return None,
    };
    Some(code)
}
