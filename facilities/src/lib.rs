//! The static transit facility dataset: stops and routes, classified into bus and rail.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod modes;
mod routes;
mod stops;

use std::path::Path;

use anyhow::Result;
use geojson::{Feature, GeoJson};
use geom::{GPSBounds, LonLat};
use serde::{Deserialize, Serialize};

pub use modes::{normalize_route_mode, normalize_stop_mode, FacilityMode};
pub use routes::Route;
pub use stops::Stop;

pub const STOPS_FILE: &str = "UTA_Stops.geojson";
pub const ROUTES_FILE: &str = "UTA_Routes.geojson";

#[derive(Clone, Serialize, Deserialize)]
pub struct Facilities {
    pub stops: Vec<Stop>,
    pub routes: Vec<Route>,
}

/// The four independently toggled overlays
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FacilityLayer {
    BusStops,
    RailStops,
    BusRoutes,
    RailRoutes,
}

impl FacilityLayer {
    pub fn all() -> Vec<Self> {
        use FacilityLayer::*;
        vec![BusStops, RailStops, BusRoutes, RailRoutes]
    }

    pub fn label(self) -> &'static str {
        match self {
            FacilityLayer::BusStops => "Bus stops",
            FacilityLayer::RailStops => "Rail stops",
            FacilityLayer::BusRoutes => "Bus routes",
            FacilityLayer::RailRoutes => "Rail routes",
        }
    }
}

impl Stop {
    pub fn layer(&self) -> FacilityLayer {
        match self.mode {
            FacilityMode::Bus => FacilityLayer::BusStops,
            FacilityMode::Rail => FacilityLayer::RailStops,
        }
    }
}

impl Route {
    pub fn layer(&self) -> FacilityLayer {
        match self.mode {
            FacilityMode::Bus => FacilityLayer::BusRoutes,
            FacilityMode::Rail => FacilityLayer::RailRoutes,
        }
    }
}

impl Facilities {
    /// Reads both GeoJSON files from a directory. A missing file is an error; the caller decides
    /// whether the dashboard can live without facilities.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let stops = fs_err::read_to_string(dir.join(STOPS_FILE))?;
        let routes = fs_err::read_to_string(dir.join(ROUTES_FILE))?;
        Self::parse(&stops, &routes)
    }

    pub fn parse(raw_stops: &str, raw_routes: &str) -> Result<Self> {
        let (stops, skipped) = stops::load(raw_stops)?;
        let routes = routes::load(raw_routes)?;
        info!(
            "Loaded {} stops ({} skipped without a bus or rail mode) and {} routes",
            stops.len(),
            skipped,
            routes.len()
        );
        Ok(Self { stops, routes })
    }

    pub fn empty() -> Self {
        Self {
            stops: Vec::new(),
            routes: Vec::new(),
        }
    }

    pub fn gps_bounds(&self) -> GPSBounds {
        let mut bounds = GPSBounds::new();
        for stop in &self.stops {
            bounds.update(stop.pos);
        }
        for route in &self.routes {
            for line in &route.lines {
                for pt in line {
                    bounds.update(*pt);
                }
            }
        }
        bounds
    }

    pub fn stops_in_layer(&self, layer: FacilityLayer) -> impl Iterator<Item = &Stop> {
        self.stops.iter().filter(move |s| s.layer() == layer)
    }

    pub fn routes_in_layer(&self, layer: FacilityLayer) -> impl Iterator<Item = &Route> {
        self.routes.iter().filter(move |r| r.layer() == layer)
    }
}

fn features(raw: &str) -> Result<Vec<Feature>> {
    match raw.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => Ok(fc.features),
        GeoJson::Feature(feature) => Ok(vec![feature]),
        GeoJson::Geometry(_) => bail!("Expected a FeatureCollection, found a bare geometry"),
    }
}

// Numbers and other scalars are stringified; null and absent are both None
fn string_property(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(x) => Some(x.clone()),
        x => Some(x.to_string()),
    }
}

// GeoJSON positions are [lon, lat, ...]
fn position(pt: &[f64]) -> Option<LonLat> {
    if pt.len() < 2 || !pt[0].is_finite() || !pt[1].is_finite() {
        return None;
    }
    Some(LonLat::new(pt[0], pt[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_and_bounds() {
        let stops = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"stop_name": "A", "mode": "Bus"},
             "geometry": {"type": "Point", "coordinates": [-112.0, 40.5]}},
            {"type": "Feature", "properties": {"stop_name": "B", "mode": "TRAX"},
             "geometry": {"type": "Point", "coordinates": [-111.5, 41.0]}}
        ]}"#;
        let routes = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"route_name": "2", "routetype": "Local"},
             "geometry": {"type": "LineString", "coordinates": [[-111.9, 40.6], [-111.8, 40.7]]}}
        ]}"#;
        let facilities = Facilities::parse(stops, routes).unwrap();
        assert_eq!(facilities.stops_in_layer(FacilityLayer::BusStops).count(), 1);
        assert_eq!(facilities.stops_in_layer(FacilityLayer::RailStops).count(), 1);
        assert_eq!(facilities.routes_in_layer(FacilityLayer::BusRoutes).count(), 1);
        assert_eq!(facilities.routes_in_layer(FacilityLayer::RailRoutes).count(), 0);

        let bounds = facilities.gps_bounds();
        assert_eq!(bounds.min_lon, -112.0);
        assert_eq!(bounds.max_lon, -111.5);
        assert_eq!(bounds.min_lat, 40.5);
        assert_eq!(bounds.max_lat, 41.0);
    }

    #[test]
    fn bare_geometry_is_rejected() {
        let raw = r#"{"type": "Point", "coordinates": [-111.9, 40.7]}"#;
        assert!(features(raw).is_err());
    }

    #[test]
    fn non_finite_positions() {
        assert!(position(&[f64::NAN, 40.0]).is_none());
        assert!(position(&[-111.0]).is_none());
        assert!(position(&[-111.0, 40.0, 1300.0]).is_some());
    }
}
