//! Reported labels and derived statuses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A status a user can report for a study space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusLabel {
    #[serde(rename = "Available")]
    Available,
    #[serde(rename = "Nearly Full")]
    NearlyFull,
    #[serde(rename = "Full")]
    Full,
}

impl StatusLabel {
    /// Consensus tie-break order: on equal counts the earlier label wins.
    pub const PRIORITY: [Self; 3] = [Self::Available, Self::NearlyFull, Self::Full];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::NearlyFull => "Nearly Full",
            Self::Full => "Full",
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored or submitted label is not one of the known three.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status label: {0:?}")]
pub struct UnknownStatusLabel(pub String);

impl FromStr for StatusLabel {
    type Err = UnknownStatusLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(Self::Available),
            "Nearly Full" => Ok(Self::NearlyFull),
            "Full" => Ok(Self::Full),
            other => Err(UnknownStatusLabel(other.to_string())),
        }
    }
}

/// Derived status of a space or a building.
///
/// Variants are declared from least to most free, so `Ord` ranks statuses
/// by free-ness: `Unknown < Full < NearlyFull < Available`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Status {
    #[default]
    #[serde(rename = "Unknown")]
    Unknown,
    #[serde(rename = "Full")]
    Full,
    #[serde(rename = "Nearly Full")]
    NearlyFull,
    #[serde(rename = "Available")]
    Available,
}

impl Status {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Full => "Full",
            Self::NearlyFull => "Nearly Full",
            Self::Available => "Available",
        }
    }
}

impl From<StatusLabel> for Status {
    fn from(label: StatusLabel) -> Self {
        match label {
            StatusLabel::Available => Self::Available,
            StatusLabel::NearlyFull => Self::NearlyFull,
            StatusLabel::Full => Self::Full,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_from_display_names() {
        for label in StatusLabel::PRIORITY {
            assert_eq!(label.as_str().parse::<StatusLabel>().unwrap(), label);
        }
        assert!("nearlyFull".parse::<StatusLabel>().is_err());
        assert!("".parse::<StatusLabel>().is_err());
    }

    #[test]
    fn status_orders_by_freeness() {
        assert!(Status::Available > Status::NearlyFull);
        assert!(Status::NearlyFull > Status::Full);
        assert!(Status::Full > Status::Unknown);
    }

    #[test]
    fn serializes_with_spaced_names() {
        assert_eq!(
            serde_json::to_string(&Status::NearlyFull).unwrap(),
            "\"Nearly Full\""
        );
        assert_eq!(
            serde_json::from_str::<StatusLabel>("\"Nearly Full\"").unwrap(),
            StatusLabel::NearlyFull
        );
    }
}
