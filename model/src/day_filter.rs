use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::LinkedTrip;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayFilter {
    None,
    /// Day of the month, 1 through 31
    DayOfMonth(u32),
}

impl DayFilter {
    /// Empty input means no filter. Accepts "5" or "05".
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            return Ok(DayFilter::None);
        }
        let day: u32 = raw
            .parse()
            .map_err(|_| anyhow!("Day filter {raw:?} isn't a number"))?;
        if !(1..=31).contains(&day) {
            bail!("Day filter {day} isn't a day of the month");
        }
        Ok(DayFilter::DayOfMonth(day))
    }

    pub fn describe(self) -> String {
        match self {
            DayFilter::None => "all days".to_string(),
            DayFilter::DayOfMonth(day) => format!("day {day:02}"),
        }
    }

    /// Under an active filter, trips without a parseable start time never match.
    pub fn matches(self, trip: &LinkedTrip) -> bool {
        let wanted = match self {
            DayFilter::None => return true,
            DayFilter::DayOfMonth(day) => day,
        };
        let raw = match trip.start_time() {
            Some(x) => x,
            None => {
                debug!("Trip {} has no start time", trip.linked_trip_id);
                return false;
            }
        };
        match day_of_month(raw) {
            Ok(day) => day == wanted,
            Err(err) => {
                debug!("Trip {}: {err}", trip.linked_trip_id);
                false
            }
        }
    }

    pub fn apply(self, trips: Vec<LinkedTrip>) -> Vec<LinkedTrip> {
        if self == DayFilter::None {
            return trips;
        }
        trips.into_iter().filter(|t| self.matches(t)).collect()
    }
}

/// Parses an ISO-8601-ish timestamp, with or without an offset, fractional seconds, or a time
/// component at all.
pub fn day_of_month(timestamp: &str) -> Result<u32> {
    let ts = timestamp.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Ok(dt.day());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(ts, fmt) {
            return Ok(dt.day());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(ts, "%Y-%m-%d") {
        return Ok(date.day());
    }
    bail!("Malformed timestamp {ts:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Endpoint, Leg, TripID};

    fn trip(id: &str, start_time: Option<&str>) -> LinkedTrip {
        LinkedTrip {
            linked_trip_id: TripID(id.to_string()),
            origin: Some(Endpoint {
                start_time: start_time.map(|x| x.to_string()),
                ..Default::default()
            }),
            destination: None,
            legs: Vec::new(),
            transfers: Vec::new(),
        }
    }

    #[test]
    fn parse_filter() {
        assert_eq!(DayFilter::parse("").unwrap(), DayFilter::None);
        assert_eq!(DayFilter::parse("all").unwrap(), DayFilter::None);
        assert_eq!(DayFilter::parse("5").unwrap(), DayFilter::DayOfMonth(5));
        assert_eq!(DayFilter::parse("05").unwrap(), DayFilter::DayOfMonth(5));
        assert!(DayFilter::parse("0").is_err());
        assert!(DayFilter::parse("32").is_err());
        assert!(DayFilter::parse("fifth").is_err());
    }

    #[test]
    fn timestamps() {
        assert_eq!(day_of_month("2020-01-05T08:00:00").unwrap(), 5);
        assert_eq!(day_of_month("2020-01-15T08:00:00.250").unwrap(), 15);
        assert_eq!(day_of_month("2020-01-31T23:59:00-07:00").unwrap(), 31);
        assert_eq!(day_of_month("2020-01-09 07:15:00").unwrap(), 9);
        assert_eq!(day_of_month("2020-01-20").unwrap(), 20);
        assert!(day_of_month("01/05/2020").is_err());
        assert!(day_of_month("").is_err());
    }

    #[test]
    fn keeps_only_matching_day() {
        let trips = vec![
            trip("a", Some("2020-01-05T08:00:00")),
            trip("b", Some("2020-01-15T08:00:00")),
        ];
        let kept = DayFilter::parse("5").unwrap().apply(trips);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].linked_trip_id, TripID("a".to_string()));
    }

    #[test]
    fn falls_back_to_first_leg_start() {
        let mut legs_only = trip("legs-only", None);
        legs_only.origin = None;
        legs_only.legs = vec![
            Leg {
                start_time: Some("2020-01-05 07:15:00".to_string()),
                ..crate::fixtures::leg("bus", Vec::new())
            },
            Leg {
                start_time: Some("2020-01-06 07:45:00".to_string()),
                ..crate::fixtures::leg("rail", Vec::new())
            },
        ];
        let mut other_day = legs_only.clone();
        other_day.linked_trip_id = TripID("other-day".to_string());
        other_day.legs[0].start_time = Some("2020-01-06 07:15:00".to_string());

        assert_eq!(legs_only.start_time(), Some("2020-01-05 07:15:00"));
        let kept = DayFilter::DayOfMonth(5).apply(vec![legs_only, other_day]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].linked_trip_id, TripID("legs-only".to_string()));
    }

    #[test]
    fn unparseable_start_excluded_only_when_filtering() {
        let trips = vec![trip("a", None), trip("b", Some("garbage"))];
        assert_eq!(DayFilter::None.apply(trips.clone()).len(), 2);
        assert!(DayFilter::DayOfMonth(5).apply(trips).is_empty());
    }
}
