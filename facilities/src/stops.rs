use anyhow::Result;
use geojson::Value;
use geom::LonLat;
use serde::{Deserialize, Serialize};

use crate::modes::{normalize_stop_mode, FacilityMode};
use crate::{features, position, string_property};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stop {
    pub name: Option<String>,
    /// The original free-text mode, kept for tooltips
    pub raw_mode: Option<String>,
    pub mode: FacilityMode,
    pub pos: LonLat,
}

/// Returns the stops with a recognized mode, and how many features were skipped.
pub fn load(raw: &str) -> Result<(Vec<Stop>, usize)> {
    let mut stops = Vec::new();
    let mut skipped = 0;
    for feature in features(raw)? {
        let raw_mode = string_property(&feature, "mode");
        let mode = match normalize_stop_mode(raw_mode.as_deref()) {
            Some(mode) => mode,
            None => {
                skipped += 1;
                continue;
            }
        };
        let pos = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::Point(pt)) => position(pt),
            _ => None,
        };
        let pos = match pos {
            Some(pos) => pos,
            None => {
                debug!("Stop {:?} has no usable point geometry", raw_mode);
                skipped += 1;
                continue;
            }
        };
        stops.push(Stop {
            name: string_property(&feature, "stop_name"),
            raw_mode,
            mode,
            pos,
        });
    }
    Ok((stops, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_unknown_modes_and_bad_points() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"stop_name": "Central Station", "mode": "TRAX"},
                 "geometry": {"type": "Point", "coordinates": [-111.909, 40.761]}},
                {"type": "Feature", "properties": {"stop_name": "State St", "mode": "Bus"},
                 "geometry": {"type": "Point", "coordinates": [-111.888, 40.750]}},
                {"type": "Feature", "properties": {"stop_name": "Depot", "mode": "Paratransit"},
                 "geometry": {"type": "Point", "coordinates": [-111.9, 40.7]}},
                {"type": "Feature", "properties": {"stop_name": "Nowhere", "mode": "bus"},
                 "geometry": null}
            ]
        }"#;
        let (stops, skipped) = load(raw).unwrap();
        assert_eq!(stops.len(), 2);
        assert_eq!(skipped, 2);
        assert_eq!(stops[0].mode, FacilityMode::Rail);
        assert_eq!(stops[0].name.as_deref(), Some("Central Station"));
        assert_eq!(stops[1].mode, FacilityMode::Bus);
        assert!((stops[1].pos.x() - -111.888).abs() < 1e-9);
        assert!((stops[1].pos.y() - 40.750).abs() < 1e-9);
    }
}
