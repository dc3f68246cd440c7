use std::collections::BTreeSet;

use anyhow::Result;
use geom::LonLat;
use serde::{Deserialize, Serialize};

use crate::trips::parse_each;

/// One aggregate flow between two points, from `OD/od_dashboard_topk.json`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OdRecord {
    #[serde(default)]
    pub o_lat: Option<f64>,
    #[serde(default)]
    pub o_lon: Option<f64>,
    #[serde(default)]
    pub d_lat: Option<f64>,
    #[serde(default)]
    pub d_lon: Option<f64>,
    #[serde(default)]
    pub linked_count: Option<f64>,
    #[serde(default)]
    pub unlinked_count: Option<f64>,
    #[serde(default)]
    pub month: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlowOptions {
    pub month: Option<String>,
    /// Otherwise use unlinked counts
    pub use_linked: bool,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            month: None,
            use_linked: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FlowPrimitive {
    /// Origin, offset midpoint, destination
    Curve {
        pts: [LonLat; 3],
        weight: f64,
        count: f64,
    },
    /// Origin and destination coincide
    IntraTract {
        center: LonLat,
        radius: f64,
        count: f64,
    },
}

impl FlowPrimitive {
    pub fn count(&self) -> f64 {
        match self {
            FlowPrimitive::Curve { count, .. } | FlowPrimitive::IntraTract { count, .. } => *count,
        }
    }

    pub fn describe(&self, opts: &FlowOptions) -> String {
        let kind = if opts.use_linked { "linked" } else { "unlinked" };
        match self {
            FlowPrimitive::Curve { count, .. } => format!("{count} {kind} trips"),
            FlowPrimitive::IntraTract { count, .. } => {
                format!("{count} {kind} trips within the same tract")
            }
        }
    }
}

/// The file must be a JSON list. Elements that don't look like an `OdRecord` are skipped.
pub fn parse_records(raw: &[u8]) -> Result<Vec<OdRecord>> {
    let values: Vec<serde_json::Value> = serde_json::from_slice(raw)?;
    Ok(parse_each(values, "OD record"))
}

// A record that passed filtering
struct ValidFlow {
    o_lat: f64,
    o_lon: f64,
    d_lat: f64,
    d_lon: f64,
    count: f64,
}

fn valid_flows(records: &[OdRecord], opts: &FlowOptions) -> Vec<ValidFlow> {
    let mut flows = Vec::new();
    for (idx, rec) in records.iter().enumerate() {
        if let Some(ref month) = opts.month {
            if rec.month.as_ref() != Some(month) {
                continue;
            }
        }
        let count = if opts.use_linked {
            rec.linked_count
        } else {
            rec.unlinked_count
        };
        match (rec.o_lat, rec.o_lon, rec.d_lat, rec.d_lon, count) {
            (Some(o_lat), Some(o_lon), Some(d_lat), Some(d_lon), Some(count))
                if [o_lat, o_lon, d_lat, d_lon, count]
                    .iter()
                    .all(|x| x.is_finite())
                    && count > 0.0 =>
            {
                flows.push(ValidFlow {
                    o_lat,
                    o_lon,
                    d_lat,
                    d_lon,
                    count,
                });
            }
            _ => {
                debug!("Skipping OD record {idx}: {:?}", rec);
            }
        }
    }
    flows
}

/// The largest selected count among records that survive filtering, never less than 1.
pub fn max_count(records: &[OdRecord], opts: &FlowOptions) -> f64 {
    max_of(&valid_flows(records, opts))
}

fn max_of(flows: &[ValidFlow]) -> f64 {
    flows.iter().map(|f| f.count).fold(1.0, f64::max)
}

pub fn build_flow_curves(records: &[OdRecord], opts: &FlowOptions) -> Vec<FlowPrimitive> {
    let flows = valid_flows(records, opts);
    let max = max_of(&flows);

    flows
        .into_iter()
        .map(|f| {
            let pct = f.count / max;
            if f.o_lat == f.d_lat && f.o_lon == f.d_lon {
                return FlowPrimitive::IntraTract {
                    center: LonLat::new(f.o_lon, f.o_lat),
                    radius: 6.0 + 10.0 * pct,
                    count: f.count,
                };
            }

            // Bulge north, proportional to the length of the flow
            let curvature = 0.3 * (f.d_lat - f.o_lat).hypot(f.d_lon - f.o_lon);
            let mid_lat = (f.o_lat + f.d_lat) / 2.0 + curvature;
            let mid_lon = (f.o_lon + f.d_lon) / 2.0;
            FlowPrimitive::Curve {
                pts: [
                    LonLat::new(f.o_lon, f.o_lat),
                    LonLat::new(mid_lon, mid_lat),
                    LonLat::new(f.d_lon, f.d_lat),
                ],
                weight: 1.0 + 6.0 * pct,
                count: f.count,
            }
        })
        .collect()
}

/// Distinct months present in the records, sorted
pub fn months(records: &[OdRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.month.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
