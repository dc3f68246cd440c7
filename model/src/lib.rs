//! Turns the static OD and linked-trip documents into things the map can draw.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod day_filter;
mod flows;
mod geometry;
mod highlight;
pub mod histogram;
mod loader;
mod session;
mod stats;
mod trips;

#[cfg(test)]
mod fixtures;

pub use day_filter::{day_of_month, DayFilter};
pub use flows::{
    build_flow_curves, max_count, months, parse_records, FlowOptions, FlowPrimitive, OdRecord,
};
pub use geometry::{
    build_trip_geometry, MarkerKind, PrimitiveID, TripGeometry, TripPrimitive,
    TRANSFER_OFFSET_DEGREES,
};
pub use highlight::{Emphasis, HighlightEvent, HighlightState, Style};
pub use loader::{
    load_od, parse_sample, tracts_in, DataSource, LoadOutcome, LocalDir, OdData, OdPair,
    OdSelection, Tract, OD_FLOWS_PATH,
};
pub use session::{Applied, Generation, MapSession, RequestTracker};
pub use stats::{
    bin_durations, percentile, Counts, DurationStats, ModeInvolvement, OdStats, SegmentStats,
    TravelTimeHistogram,
};
pub use trips::{
    build_trip_summary, Endpoint, Leg, LinkedTrip, Mode, OdTracts, SampleDocument, TractArea,
    Transfer, TripID, TripSummary,
};
