//! Availability aggregation.
//!
//! Users report one of three [`StatusLabel`]s for a study space. Reports that
//! fall inside the trailing [`ReportWindow`] are folded into a per-space
//! consensus by the [`Aggregator`], and per-space results are folded into a
//! per-building consensus by [`aggregate_building`].

mod aggregate;
mod building;
mod status;
mod window;

pub use aggregate::{Aggregator, RawCounts, SpaceAvailability, DEFAULT_VERIFICATION_FLOOR};
pub use building::{aggregate_building, BuildingAvailability};
pub use status::{Status, StatusLabel, UnknownStatusLabel};
pub use window::{ReportWindow, DEFAULT_WINDOW_SECS};
