use anyhow::Result;
use geojson::Value;
use geom::LonLat;
use serde::{Deserialize, Serialize};

use crate::modes::{normalize_route_mode, FacilityMode};
use crate::{features, position, string_property};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Route {
    pub name: Option<String>,
    pub raw_route_type: Option<String>,
    pub mode: FacilityMode,
    // A route may be split into several pieces
    pub lines: Vec<Vec<LonLat>>,
}

impl Route {
    pub fn describe(&self) -> String {
        let name = self.name.clone().unwrap_or_else(|| "unnamed route".to_string());
        match self.raw_route_type {
            Some(ref x) => format!("{name} ({x})"),
            None => name,
        }
    }
}

pub fn load(raw: &str) -> Result<Vec<Route>> {
    let mut routes = Vec::new();
    for feature in features(raw)? {
        let lines: Vec<Vec<LonLat>> = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::LineString(pts)) => vec![line(pts)],
            Some(Value::MultiLineString(pieces)) => pieces.iter().map(|pts| line(pts)).collect(),
            _ => Vec::new(),
        };
        let lines: Vec<Vec<LonLat>> = lines.into_iter().filter(|l| l.len() >= 2).collect();
        let raw_route_type = string_property(&feature, "routetype");
        if lines.is_empty() {
            debug!("Route {:?} has no usable line geometry", raw_route_type);
            continue;
        }
        routes.push(Route {
            name: string_property(&feature, "route_name"),
            mode: normalize_route_mode(raw_route_type.as_deref()),
            raw_route_type,
            lines,
        });
    }
    Ok(routes)
}

fn line(pts: &[Vec<f64>]) -> Vec<LonLat> {
    pts.iter().filter_map(|pt| position(pt)).collect()
}
