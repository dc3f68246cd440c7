use anyhow::Result;
use geom::GPSBounds;

use crate::{
    build_trip_geometry, Emphasis, HighlightEvent, HighlightState, LoadOutcome, OdData,
    TripGeometry,
};

/// Identifies one issued load. Only the most recent one may touch the view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

#[derive(Default)]
pub struct RequestTracker {
    latest: u64,
}

impl RequestTracker {
    pub fn issue(&mut self) -> Generation {
        self.latest += 1;
        Generation(self.latest)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.latest
    }
}

#[derive(Debug, PartialEq)]
pub enum Applied {
    /// A newer request was issued since; nothing changed
    Stale,
    /// Fit the view to these bounds, or leave it alone if None
    Updated { recenter: Option<GPSBounds> },
}

/// Everything the map view owns between interactions: the drawn trips, the current selection,
/// and the last bounds the view was fitted to.
pub struct MapSession {
    requests: RequestTracker,
    pub highlight: HighlightState,
    pub data: Option<OdData>,
    pub geometry: TripGeometry,
    pub fitted_bounds: Option<GPSBounds>,
    pub status: String,
}

impl MapSession {
    pub fn new() -> Self {
        Self {
            requests: RequestTracker::default(),
            highlight: HighlightState::Idle,
            data: None,
            geometry: TripGeometry::empty(),
            fitted_bounds: None,
            status: LoadOutcome::Incomplete.status(),
        }
    }

    pub fn begin_load(&mut self) -> Generation {
        self.requests.issue()
    }

    pub fn apply(&mut self, generation: Generation, result: Result<LoadOutcome>) -> Applied {
        if !self.requests.is_current(generation) {
            debug!("Dropping the response for stale request {:?}", generation);
            return Applied::Stale;
        }

        self.highlight = HighlightState::Idle;
        match result {
            Ok(outcome @ LoadOutcome::Loaded(_)) => {
                self.status = outcome.status();
                if let LoadOutcome::Loaded(data) = outcome {
                    self.geometry = build_trip_geometry(&data.trips);
                    self.data = Some(data);
                }
                if let Some(ref bounds) = self.geometry.bounds {
                    self.fitted_bounds = Some(bounds.clone());
                }
                Applied::Updated {
                    recenter: self.geometry.bounds.clone(),
                }
            }
            Ok(LoadOutcome::Incomplete) => {
                self.clear();
                self.status = LoadOutcome::Incomplete.status();
                Applied::Updated { recenter: None }
            }
            Err(err) => {
                warn!("Selection failed: {err}");
                // Never leave old trips next to an error
                self.clear();
                self.status = format!("Failed to load trips: {err}");
                Applied::Updated { recenter: None }
            }
        }
    }

    fn clear(&mut self) {
        self.data = None;
        self.geometry = TripGeometry::empty();
    }

    /// True if the selection changed
    pub fn on_highlight_event(&mut self, event: HighlightEvent) -> bool {
        let next = self.highlight.clone().transition(event);
        if next == self.highlight {
            return false;
        }
        self.highlight = next;
        true
    }

    pub fn emphasis(&self) -> Vec<Emphasis> {
        self.highlight.assign(&self.geometry)
    }
}

impl Default for MapSession {
    fn default() -> Self {
        Self::new()
    }
}
