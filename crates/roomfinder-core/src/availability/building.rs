use serde::{Deserialize, Serialize};

use super::aggregate::SpaceAvailability;
use super::status::Status;

/// Consensus for a building, folded from its spaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingAvailability {
    pub status: Status,
    pub is_verified: bool,
}

impl BuildingAvailability {
    /// Fold one space into the running result: keep the freest status and
    /// OR the verification flags.
    #[must_use]
    pub fn absorb(self, status: Status, is_verified: bool) -> Self {
        Self {
            status: self.status.max(status),
            is_verified: self.is_verified || is_verified,
        }
    }
}

/// Combine per-space results into the building's overall status.
pub fn aggregate_building<'a, I>(spaces: I) -> BuildingAvailability
where
    I: IntoIterator<Item = &'a SpaceAvailability>,
{
    spaces
        .into_iter()
        .fold(BuildingAvailability::default(), |acc, space| {
            acc.absorb(space.status, space.is_verified)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::Aggregator;

    #[test]
    fn no_spaces_is_unknown() {
        let result = aggregate_building(&[]);
        assert_eq!(result.status, Status::Unknown);
        assert!(!result.is_verified);
    }

    #[test]
    fn freest_space_wins_and_verification_propagates() {
        let aggregator = Aggregator::default();
        let busy = aggregator.aggregate(["Available", "Available", "Available"]);
        let quiet = aggregator.aggregate(Vec::<&str>::new());
        let result = aggregate_building(&[quiet, busy]);
        assert_eq!(result.status, Status::Available);
        assert!(result.is_verified);
    }

    #[test]
    fn verification_may_come_from_a_less_free_space() {
        let aggregator = Aggregator::default();
        let full = aggregator.aggregate(["Full", "Full", "Full"]);
        let nearly = aggregator.aggregate(["Nearly Full"]);
        let result = aggregate_building(&[full, nearly]);
        assert_eq!(result.status, Status::NearlyFull);
        assert!(result.is_verified);
    }

    #[test]
    fn absorb_never_lowers_status() {
        let start = BuildingAvailability {
            status: Status::Available,
            is_verified: false,
        };
        assert_eq!(start.absorb(Status::Full, false), start);
    }
}
