use std::fmt;

use geojson::Value;
use geom::LonLat;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Stable across redraws, so it also keys the highlight state
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TripID(pub String);

impl fmt::Display for TripID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// The data prep writes IDs straight from a dataframe, so they show up as strings or numbers
impl<'de> Deserialize<'de> for TripID {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(d)? {
            serde_json::Value::String(x) => Ok(TripID(x)),
            serde_json::Value::Number(x) => Ok(TripID(x.to_string())),
            x => Err(serde::de::Error::custom(format!(
                "linked_trip_id must be a string or number, not {x}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mode {
    Bus,
    Rail,
    Car,
    WalkBike,
    Unknown,
}

impl Mode {
    /// Never fails; anything unrecognized is `Unknown`
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "bus" => Mode::Bus,
            "rail" => Mode::Rail,
            "car" | "auto" => Mode::Car,
            "walk/bike" | "walk_bike" | "walk" | "bike" => Mode::WalkBike,
            _ => Mode::Unknown,
        }
    }

    pub fn color_hex(self) -> &'static str {
        match self {
            Mode::Bus => "#2563eb",
            Mode::Rail => "#7c3aed",
            Mode::Car => "#ea580c",
            Mode::WalkBike => "#16a34a",
            Mode::Unknown => "#6b7280",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Mode::Bus => "bus",
            Mode::Rail => "rail",
            Mode::Car => "car",
            Mode::WalkBike => "walk/bike",
            Mode::Unknown => "unknown",
        }
    }
}

/// The start or end of a linked trip, or the end of a leg
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub tract: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

impl Endpoint {
    /// None if either coordinate is missing or not finite
    pub fn pos(&self) -> Option<LonLat> {
        finite_pos(self.lat?, self.lon?)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transfer {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl Transfer {
    pub fn pos(&self) -> Option<LonLat> {
        finite_pos(self.lat?, self.lon?)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Leg {
    #[serde(default, deserialize_with = "null_as_default")]
    pub mode: String,
    /// [lat, lon] pairs. Nulls and short pairs are tolerated here and dropped by `points`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub route: Vec<Vec<Option<f64>>>,
    #[serde(default)]
    pub duration_min: Option<f64>,
    #[serde(default)]
    pub network_distance_km: Option<f64>,
    #[serde(default)]
    pub start_time: Option<String>,
}

impl Leg {
    pub fn mode(&self) -> Mode {
        Mode::parse(&self.mode)
    }

    /// Only the finite coordinates, as (lon, lat)
    pub fn points(&self) -> Vec<LonLat> {
        self.route
            .iter()
            .filter_map(|pair| match pair.as_slice() {
                [Some(lat), Some(lon), ..] => finite_pos(*lat, *lon),
                _ => None,
            })
            .collect()
    }

    pub fn describe(&self, idx: usize) -> String {
        format!(
            "Leg {}: {}, {}, {}",
            idx + 1,
            self.mode().describe(),
            fmt_optional(self.network_distance_km, "km"),
            fmt_optional(self.duration_min, "min")
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinkedTrip {
    pub linked_trip_id: TripID,
    #[serde(default)]
    pub origin: Option<Endpoint>,
    #[serde(default)]
    pub destination: Option<Endpoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub legs: Vec<Leg>,
    #[serde(default, deserialize_with = "skip_malformed")]
    pub transfers: Vec<Transfer>,
}

/// Totals over the legs of one linked trip
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TripSummary {
    pub total_distance_km: f64,
    pub total_duration_min: f64,
    pub segments: usize,
}

/// Legs missing a distance or duration contribute nothing to that total.
pub fn build_trip_summary(legs: &[Leg]) -> TripSummary {
    TripSummary {
        total_distance_km: legs
            .iter()
            .filter_map(|leg| leg.network_distance_km)
            .filter(|x| x.is_finite())
            .sum(),
        total_duration_min: legs
            .iter()
            .filter_map(|leg| leg.duration_min)
            .filter(|x| x.is_finite())
            .sum(),
        segments: legs.len(),
    }
}

impl LinkedTrip {
    pub fn summary(&self) -> TripSummary {
        build_trip_summary(&self.legs)
    }

    /// The recorded start of the whole trip, falling back to the first leg
    pub fn start_time(&self) -> Option<&str> {
        self.origin
            .as_ref()
            .and_then(|o| o.start_time.as_deref())
            .or_else(|| self.legs.first().and_then(|l| l.start_time.as_deref()))
    }

    pub fn describe(&self) -> String {
        let summary = self.summary();
        format!(
            "Trip {}: {:.1} km, {:.1} min, {} segment{}",
            self.linked_trip_id,
            summary.total_distance_km,
            summary.total_duration_min,
            summary.segments,
            if summary.segments == 1 { "" } else { "s" }
        )
    }
}

/// A `{origin}_to_{destination}.json` sample file
#[derive(Clone, Debug, Deserialize)]
pub struct SampleDocument {
    #[serde(default)]
    pub od: Option<OdTracts>,
    #[serde(deserialize_with = "skip_malformed")]
    pub linked_trips: Vec<LinkedTrip>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OdTracts {
    pub origin: TractArea,
    pub destination: TractArea,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TractArea {
    #[serde(default)]
    pub tract_id: Option<String>,
    #[serde(default)]
    pub geometry: Option<geojson::Geometry>,
}

impl TractArea {
    /// Exterior rings of the tract, skipping holes. Empty if there's no polygon geometry.
    pub fn outline(&self) -> Vec<Vec<LonLat>> {
        let ring = |pts: &Vec<Vec<f64>>| -> Vec<LonLat> {
            pts.iter()
                .filter(|pt| pt.len() >= 2)
                .filter_map(|pt| finite_pos(pt[1], pt[0]))
                .collect()
        };
        let rings: Vec<Vec<LonLat>> = match self.geometry.as_ref().map(|g| &g.value) {
            Some(Value::Polygon(rings)) => rings.first().map(ring).into_iter().collect(),
            Some(Value::MultiPolygon(polygons)) => polygons
                .iter()
                .filter_map(|rings| rings.first().map(ring))
                .collect(),
            _ => Vec::new(),
        };
        rings.into_iter().filter(|r| r.len() >= 3).collect()
    }
}

pub(crate) fn finite_pos(lat: f64, lon: f64) -> Option<LonLat> {
    if lat.is_finite() && lon.is_finite() {
        Some(LonLat::new(lon, lat))
    } else {
        None
    }
}

fn fmt_optional(x: Option<f64>, unit: &str) -> String {
    match x {
        Some(x) if x.is_finite() => format!("{x:.1} {unit}"),
        _ => format!("N/A {unit}"),
    }
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Converts each element of a JSON list on its own, dropping the ones that don't fit `T`.
pub(crate) fn parse_each<T: DeserializeOwned>(
    values: Vec<serde_json::Value>,
    what: &str,
) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| match serde_json::from_value(value) {
            Ok(x) => Some(x),
            Err(err) => {
                debug!("Skipping malformed {what} {idx}: {err}");
                None
            }
        })
        .collect()
}

// A null list is empty; a bad element is skipped instead of failing the whole document
fn skip_malformed<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values: Vec<serde_json::Value> = null_as_default(d)?;
    Ok(parse_each(values, "list element"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(distance: Option<f64>, duration: Option<f64>) -> Leg {
        Leg {
            mode: "bus".to_string(),
            route: Vec::new(),
            duration_min: duration,
            network_distance_km: distance,
            start_time: None,
        }
    }

    #[test]
    fn summary_sums_legs() {
        let summary = build_trip_summary(&[leg(Some(3.0), Some(10.0)), leg(Some(5.5), Some(20.0))]);
        assert_eq!(summary.total_distance_km, 8.5);
        assert_eq!(summary.total_duration_min, 30.0);
        assert_eq!(summary.segments, 2);
    }

    #[test]
    fn missing_values_contribute_zero() {
        let summary = build_trip_summary(&[leg(None, Some(12.5)), leg(Some(2.0), None)]);
        assert_eq!(summary.total_distance_km, 2.0);
        assert_eq!(summary.total_duration_min, 12.5);
        assert_eq!(build_trip_summary(&[]).segments, 0);
    }

    #[test]
    fn mode_parsing() {
        assert_eq!(Mode::parse("Bus"), Mode::Bus);
        assert_eq!(Mode::parse(" rail "), Mode::Rail);
        assert_eq!(Mode::parse("walk/bike"), Mode::WalkBike);
        assert_eq!(Mode::parse("car"), Mode::Car);
        assert_eq!(Mode::parse("hovercraft"), Mode::Unknown);
        assert_eq!(Mode::parse(""), Mode::Unknown);
        assert_eq!(Mode::Unknown.color_hex(), "#6b7280");
    }

    #[test]
    fn parse_sample_document() {
        let raw = r#"{
            "schema": "nova.complete_trip.sample.v2",
            "od": {
                "origin": {"tract_id": "49035114000", "geometry": {"type": "Polygon",
                    "coordinates": [[[-111.9, 40.7], [-111.8, 40.7], [-111.8, 40.8], [-111.9, 40.7]]]}},
                "destination": {"tract_id": "49035980000", "geometry": null}
            },
            "linked_trips": [
                {
                    "linked_trip_id": 12345,
                    "origin": {"lat": 40.75, "lon": -111.89, "start_time": "2020-01-05T08:00:00"},
                    "destination": {"lat": null, "lon": -111.8},
                    "transfers": [{"lat": 40.76, "lon": -111.88, "geohash": "9x0qz"}],
                    "legs": [
                        {"mode": "walk/bike", "route": [[40.75, -111.89], [40.76, -111.88]],
                         "duration_min": 4.5, "network_distance_km": 0.3},
                        {"mode": "rail", "route": null, "duration_min": null}
                    ]
                },
                {"linked_trip_id": "abc", "legs": null}
            ]
        }"#;
        let doc: SampleDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.linked_trips.len(), 2);

        let trip = &doc.linked_trips[0];
        assert_eq!(trip.linked_trip_id, TripID("12345".to_string()));
        assert!(trip.origin.as_ref().unwrap().pos().is_some());
        assert!(trip.destination.as_ref().unwrap().pos().is_none());
        assert_eq!(trip.start_time(), Some("2020-01-05T08:00:00"));
        assert_eq!(trip.legs[0].mode(), Mode::WalkBike);
        assert_eq!(trip.legs[0].points().len(), 2);
        assert!(trip.legs[1].route.is_empty());
        assert_eq!(trip.describe(), "Trip 12345: 0.3 km, 4.5 min, 2 segments");
        assert_eq!(trip.legs[1].describe(1), "Leg 2: rail, N/A km, N/A min");

        assert!(doc.linked_trips[1].legs.is_empty());

        let od = doc.od.unwrap();
        assert_eq!(od.origin.outline().len(), 1);
        assert_eq!(od.origin.outline()[0].len(), 4);
        assert!(od.destination.outline().is_empty());
    }

    #[test]
    fn bad_trip_skipped() {
        let raw = r#"{"linked_trips": [
            {"linked_trip_id": [1, 2]},
            {"linked_trip_id": "mode-is-a-number", "legs": [{"mode": 3}]},
            {"linked_trip_id": "ok", "transfers": [{"lat": "north"}, {"lat": 40.7, "lon": -111.9}]}
        ]}"#;
        let doc: SampleDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.linked_trips.len(), 1);
        assert_eq!(doc.linked_trips[0].linked_trip_id, TripID("ok".to_string()));
        assert_eq!(doc.linked_trips[0].transfers.len(), 1);

        // The list itself still has to be there
        assert!(serde_json::from_str::<SampleDocument>(r#"{"linked_trips": 5}"#).is_err());
    }

    #[test]
    fn route_tolerates_bad_points() {
        let raw = r#"{"mode": "bus", "route": [[40.7, -111.9], [null, -111.8], [40.8], [40.9, -111.7]]}"#;
        let leg: Leg = serde_json::from_str(raw).unwrap();
        assert_eq!(leg.route.len(), 4);
        assert_eq!(
            leg.points(),
            vec![LonLat::new(-111.9, 40.7), LonLat::new(-111.7, 40.9)]
        );
    }
}
