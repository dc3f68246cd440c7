use std::collections::BTreeMap;

use geom::{GPSBounds, LonLat};

use crate::{LinkedTrip, Mode, TripID};

/// Transfers usually sit exactly on a leg endpoint. Nudge them so both stay visible.
pub const TRANSFER_OFFSET_DEGREES: f64 = 0.00015;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrimitiveID(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerKind {
    Origin,
    Destination,
    Transfer,
}

impl MarkerKind {
    pub fn color_hex(self) -> &'static str {
        match self {
            MarkerKind::Origin => "#059669",
            MarkerKind::Destination => "#dc2626",
            MarkerKind::Transfer => "#f59e0b",
        }
    }
}

#[derive(Clone, Debug)]
pub enum TripPrimitive {
    Marker {
        trip: TripID,
        kind: MarkerKind,
        pos: LonLat,
        label: String,
    },
    Leg {
        trip: TripID,
        leg_idx: usize,
        mode: Mode,
        pts: Vec<LonLat>,
        /// Totals for the whole linked trip
        summary: String,
        detail: String,
    },
}

impl TripPrimitive {
    pub fn trip(&self) -> &TripID {
        match self {
            TripPrimitive::Marker { trip, .. } | TripPrimitive::Leg { trip, .. } => trip,
        }
    }

    pub fn color_hex(&self) -> &'static str {
        match self {
            TripPrimitive::Marker { kind, .. } => kind.color_hex(),
            TripPrimitive::Leg { mode, .. } => mode.color_hex(),
        }
    }

    pub fn tooltip(&self) -> Vec<String> {
        match self {
            TripPrimitive::Marker { label, .. } => vec![label.clone()],
            TripPrimitive::Leg {
                summary, detail, ..
            } => vec![summary.clone(), detail.clone()],
        }
    }
}

#[derive(Clone)]
pub struct TripGeometry {
    pub primitives: Vec<TripPrimitive>,
    /// Only covers leg polylines, not markers. None if no leg could be drawn.
    pub bounds: Option<GPSBounds>,
    pub index: BTreeMap<TripID, Vec<PrimitiveID>>,
}

impl TripGeometry {
    pub fn empty() -> Self {
        Self {
            primitives: Vec::new(),
            bounds: None,
            index: BTreeMap::new(),
        }
    }

    pub fn get(&self, id: PrimitiveID) -> &TripPrimitive {
        &self.primitives[id.0]
    }

    pub fn primitives_of(&self, trip: &TripID) -> &[PrimitiveID] {
        self.index.get(trip).map(|ids| ids.as_slice()).unwrap_or(&[])
    }
}

pub fn build_trip_geometry(trips: &[LinkedTrip]) -> TripGeometry {
    let mut primitives = Vec::new();
    let mut bounds = GPSBounds::new();
    let mut any_legs = false;

    for trip in trips {
        let id = &trip.linked_trip_id;

        if let Some(pos) = trip.origin.as_ref().and_then(|o| o.pos()) {
            primitives.push(TripPrimitive::Marker {
                trip: id.clone(),
                kind: MarkerKind::Origin,
                pos,
                label: format!("Origin of trip {id}"),
            });
        }
        if let Some(pos) = trip.destination.as_ref().and_then(|d| d.pos()) {
            primitives.push(TripPrimitive::Marker {
                trip: id.clone(),
                kind: MarkerKind::Destination,
                pos,
                label: format!("Destination of trip {id}"),
            });
        }

        let summary = trip.describe();
        for (leg_idx, leg) in trip.legs.iter().enumerate() {
            let pts = leg.points();
            if pts.len() < 2 {
                debug!("Trip {id} leg {leg_idx} has fewer than 2 points, skipping");
                continue;
            }
            for pt in &pts {
                bounds.update(*pt);
            }
            any_legs = true;
            primitives.push(TripPrimitive::Leg {
                trip: id.clone(),
                leg_idx,
                mode: leg.mode(),
                pts,
                summary: summary.clone(),
                detail: leg.describe(leg_idx),
            });
        }

        for (idx, transfer) in trip.transfers.iter().enumerate() {
            if let Some(pos) = transfer.pos() {
                primitives.push(TripPrimitive::Marker {
                    trip: id.clone(),
                    kind: MarkerKind::Transfer,
                    pos: LonLat::new(
                        pos.x() + TRANSFER_OFFSET_DEGREES,
                        pos.y() + TRANSFER_OFFSET_DEGREES,
                    ),
                    label: format!("Transfer {} of trip {id}", idx + 1),
                });
            }
        }
    }

    let mut index: BTreeMap<TripID, Vec<PrimitiveID>> = BTreeMap::new();
    for (idx, primitive) in primitives.iter().enumerate() {
        index
            .entry(primitive.trip().clone())
            .or_insert_with(Vec::new)
            .push(PrimitiveID(idx));
    }

    TripGeometry {
        primitives,
        bounds: if any_legs { Some(bounds) } else { None },
        index,
    }
}
