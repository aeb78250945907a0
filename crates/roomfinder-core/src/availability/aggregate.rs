//! Per-space consensus over the reports inside the window.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::status::{Status, StatusLabel};

/// Minimum count a majority label needs before the consensus is trusted.
pub const DEFAULT_VERIFICATION_FLOOR: u32 = 3;

/// Number of reports per label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCounts {
    pub available: u32,
    pub nearly_full: u32,
    pub full: u32,
}

impl RawCounts {
    pub const fn record(&mut self, label: StatusLabel) {
        match label {
            StatusLabel::Available => self.available += 1,
            StatusLabel::NearlyFull => self.nearly_full += 1,
            StatusLabel::Full => self.full += 1,
        }
    }

    pub const fn get(&self, label: StatusLabel) -> u32 {
        match label {
            StatusLabel::Available => self.available,
            StatusLabel::NearlyFull => self.nearly_full,
            StatusLabel::Full => self.full,
        }
    }

    pub const fn total(&self) -> u32 {
        self.available + self.nearly_full + self.full
    }
}

/// Consensus for one study space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceAvailability {
    pub raw_reports: RawCounts,
    pub num_reports: u32,
    #[serde(rename = "studySpaceStatusName")]
    pub status: Status,
    pub is_verified: bool,
}

/// Turns the labels of the reports inside the window into a consensus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregator {
    verification_floor: u32,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(DEFAULT_VERIFICATION_FLOOR)
    }
}

impl Aggregator {
    pub const fn new(verification_floor: u32) -> Self {
        Self { verification_floor }
    }

    pub const fn verification_floor(&self) -> u32 {
        self.verification_floor
    }

    /// Aggregate stored label strings.
    ///
    /// Labels that do not parse are dropped entirely: they land in no bucket
    /// and do not count toward the majority denominator.
    pub fn aggregate<I, S>(&self, labels: I) -> SpaceAvailability
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts = RawCounts::default();
        for raw in labels {
            match raw.as_ref().parse::<StatusLabel>() {
                Ok(label) => counts.record(label),
                Err(e) => debug!(error = %e, "Skipping malformed report label"),
            }
        }
        self.from_counts(counts)
    }

    /// Derive status and verification from already-tallied counts.
    pub fn from_counts(&self, counts: RawCounts) -> SpaceAvailability {
        let total = counts.total();

        let mut status = Status::Unknown;
        let mut largest = 0;
        for label in StatusLabel::PRIORITY {
            let count = counts.get(label);
            // Strictly greater: on a tie the higher-priority label stays.
            if count > largest {
                status = label.into();
                largest = count;
            }
        }

        let is_verified = StatusLabel::PRIORITY.iter().any(|&label| {
            let count = counts.get(label);
            count * 2 > total && count >= self.verification_floor
        });

        SpaceAvailability {
            raw_reports: counts,
            num_reports: total,
            status,
            is_verified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(labels: &[&str]) -> SpaceAvailability {
        Aggregator::default().aggregate(labels)
    }

    #[test]
    fn no_reports_is_unknown_and_unverified() {
        let result = aggregate(&[]);
        assert_eq!(result.status, Status::Unknown);
        assert!(!result.is_verified);
        assert_eq!(result.num_reports, 0);
        assert_eq!(result.raw_reports, RawCounts::default());
    }

    #[test]
    fn strong_majority_is_verified() {
        let result = aggregate(&["Available", "Available", "Available", "Full"]);
        assert_eq!(
            result.raw_reports,
            RawCounts {
                available: 3,
                nearly_full: 0,
                full: 1
            }
        );
        assert_eq!(result.num_reports, 4);
        assert_eq!(result.status, Status::Available);
        assert!(result.is_verified);
    }

    #[test]
    fn two_reports_never_verify() {
        let result = aggregate(&["Full", "Full"]);
        assert_eq!(result.status, Status::Full);
        assert!(!result.is_verified);
    }

    #[test]
    fn three_unanimous_reports_verify() {
        let result = aggregate(&["Full", "Full", "Full"]);
        assert_eq!(result.status, Status::Full);
        assert!(result.is_verified);
    }

    #[test]
    fn exact_half_is_not_a_majority() {
        let result = aggregate(&["Full", "Full", "Full", "Available", "Available", "Available"]);
        assert!(!result.is_verified);
    }

    #[test]
    fn ties_follow_label_priority() {
        assert_eq!(aggregate(&["Full", "Available"]).status, Status::Available);
        assert_eq!(
            aggregate(&["Full", "Nearly Full"]).status,
            Status::NearlyFull
        );
        assert_eq!(
            aggregate(&["Full", "Full", "Nearly Full", "Nearly Full", "Available"]).status,
            Status::NearlyFull
        );
    }

    #[test]
    fn malformed_labels_are_excluded_from_denominator() {
        // Four valid "Nearly Full" against two junk entries: 4 * 2 > 4 holds
        // only because the junk is not part of the total.
        let result = aggregate(&[
            "Nearly Full",
            "Nearly Full",
            "Nearly Full",
            "Nearly Full",
            "nearlyFull",
            "Packed",
        ]);
        assert_eq!(result.num_reports, 4);
        assert_eq!(result.status, Status::NearlyFull);
        assert!(result.is_verified);

        let only_junk = aggregate(&["Packed", "busy"]);
        assert_eq!(only_junk.status, Status::Unknown);
        assert_eq!(only_junk.num_reports, 0);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let labels = ["Available", "Full", "Full", "Nearly Full", "Full"];
        let aggregator = Aggregator::default();
        assert_eq!(aggregator.aggregate(labels), aggregator.aggregate(labels));
    }

    #[test]
    fn floor_is_configurable() {
        let lenient = Aggregator::new(2);
        assert!(lenient.aggregate(["Full", "Full"]).is_verified);
        assert!(!Aggregator::default().aggregate(["Full", "Full"]).is_verified);
    }

    #[test]
    fn serializes_like_the_api_shape() {
        let json = serde_json::to_value(aggregate(&["Available"])).unwrap_or_default();
        assert_eq!(json["studySpaceStatusName"], "Available");
        assert_eq!(json["rawReports"]["nearlyFull"], 0);
        assert_eq!(json["isVerified"], false);
        assert_eq!(json["numReports"], 1);
    }
}
