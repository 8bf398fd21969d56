//! Availability status reported for a territory

/// Availability of a territory at the time it was checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvailabilityStatus {
    /// Territory can be sold
    Available,

    /// Territory is sold or otherwise closed
    NotAvailable,

    /// Broker has not confirmed either way
    Pending,
}

impl AvailabilityStatus {
    /// Get the stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Available => "Available",
            AvailabilityStatus::NotAvailable => "Not Available",
            AvailabilityStatus::Pending => "Pending",
        }
    }

    /// Parse a status from its stored or common spoken forms
    pub fn parse(s: &str) -> Option<Self> {
        let folded = s
            .trim()
            .to_lowercase()
            .replace(['_', '-'], " ");
        match folded.split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
            "available" | "open" => Some(AvailabilityStatus::Available),
            "not available" | "unavailable" | "sold" | "closed" => {
                Some(AvailabilityStatus::NotAvailable)
            }
            "pending" => Some(AvailabilityStatus::Pending),
            _ => None,
        }
    }

    /// Pending statuses never drive hierarchy-based deletion
    pub fn is_definite(&self) -> bool {
        !matches!(self, AvailabilityStatus::Pending)
    }
}

impl std::fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AvailabilityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid availability status: {}", s))
    }
}
