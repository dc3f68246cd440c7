use std::collections::BTreeSet;

use abstutil::{prettyprint_usize, Counter};
use serde::{Deserialize, Serialize};

use crate::{LinkedTrip, Mode};

pub const STATS_SCHEMA: &str = "nova.complete_trip.od_stats.v1";
pub const BIN_WIDTH_MIN: f64 = 5.0;
pub const MAX_TIME_MIN: f64 = 180.0;

/// A `{origin}_to_{destination}.stats.json` document. When an OD pair has no trips, only the
/// count and a note are present.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OdStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub counts: Counts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_duration_min: Option<DurationStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<SegmentStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode_involvement: Option<ModeInvolvement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_time_distribution: Option<TravelTimeHistogram>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Counts {
    pub linked_trips: usize,
}

/// All in minutes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DurationStats {
    #[serde(default)]
    pub min: Option<f64>,
    pub mean: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentStats {
    pub avg: f64,
    #[serde(default)]
    pub p75: Option<f64>,
    pub max: f64,
}

/// The fraction of linked trips that use each mode at least once
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModeInvolvement {
    pub car: f64,
    pub bus: f64,
    pub rail: f64,
    pub walk: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TravelTimeHistogram {
    #[serde(default)]
    pub bin_width_min: Option<f64>,
    #[serde(default)]
    pub max_time_min: Option<f64>,
    /// One more than `counts`
    pub bin_edges_min: Vec<f64>,
    pub counts: Vec<usize>,
}

impl TravelTimeHistogram {
    /// False for empty, all-zero, or inconsistent histograms.
    pub fn is_drawable(&self) -> bool {
        !self.counts.is_empty()
            && self.bin_edges_min.len() == self.counts.len() + 1
            && self.bin_edges_min.iter().all(|x| x.is_finite())
            && self.bin_edges_min.windows(2).all(|pair| pair[0] < pair[1])
            && self.counts.iter().any(|c| *c > 0)
    }
}

impl OdStats {
    /// Text for the statistics panel. Absent statistics degrade to a single message.
    pub fn summary_lines(stats: Option<&OdStats>) -> Vec<String> {
        let stats = match stats {
            Some(x) => x,
            None => return vec!["No statistics available".to_string()],
        };
        let mut lines = vec![format!(
            "Linked trips: {}",
            prettyprint_usize(stats.counts.linked_trips)
        )];
        if let Some(ref dur) = stats.trip_duration_min {
            lines.push(format!(
                "Duration: median {:.1} min (IQR {:.1} - {:.1})",
                dur.median, dur.p25, dur.p75
            ));
        }
        if let Some(ref seg) = stats.segments {
            lines.push(format!("Segments: avg {:.1}, max {}", seg.avg, seg.max));
        }
        if let Some(ref modes) = stats.mode_involvement {
            lines.push(format!(
                "Modes: car {:.1}%, bus {:.1}%, rail {:.1}%, walk {:.1}%",
                100.0 * modes.car,
                100.0 * modes.bus,
                100.0 * modes.rail,
                100.0 * modes.walk
            ));
        }
        if let Some(ref note) = stats.note {
            lines.push(note.clone());
        }
        lines
    }

    /// Recomputes the statistics document from linked trips. A trip's duration is the sum of its
    /// leg durations.
    pub fn from_trips(trips: &[LinkedTrip]) -> Self {
        if trips.is_empty() {
            return Self {
                schema: Some(STATS_SCHEMA.to_string()),
                counts: Counts { linked_trips: 0 },
                note: Some("No linked trips after distance + OD filter".to_string()),
                ..Default::default()
            };
        }

        let mut durations = Vec::new();
        let mut segments = Vec::new();
        let mut modes: Counter<Mode> = Counter::new();
        for trip in trips {
            let summary = trip.summary();
            durations.push(summary.total_duration_min);
            segments.push(summary.segments as f64);
            let used: BTreeSet<Mode> = trip.legs.iter().map(|l| l.mode()).collect();
            for mode in used {
                modes.add(mode, 1);
            }
        }
        durations.sort_by(|a, b| a.total_cmp(b));
        segments.sort_by(|a, b| a.total_cmp(b));

        let n = trips.len() as f64;
        // Both lists have one entry per trip, so they aren't empty here
        let pct = |sorted: &[f64], q| percentile(sorted, q).unwrap_or(0.0);
        let share = |mode| modes.get(mode) as f64 / n;

        Self {
            schema: Some(STATS_SCHEMA.to_string()),
            counts: Counts {
                linked_trips: trips.len(),
            },
            trip_duration_min: Some(DurationStats {
                min: durations.first().cloned(),
                mean: durations.iter().sum::<f64>() / n,
                p25: pct(&durations, 25.0),
                median: pct(&durations, 50.0),
                p75: pct(&durations, 75.0),
                max: durations.last().cloned(),
            }),
            segments: Some(SegmentStats {
                avg: segments.iter().sum::<f64>() / n,
                p75: Some(pct(&segments, 75.0).floor()),
                max: segments.last().cloned().unwrap_or(0.0),
            }),
            mode_involvement: Some(ModeInvolvement {
                car: share(Mode::Car),
                bus: share(Mode::Bus),
                rail: share(Mode::Rail),
                walk: share(Mode::WalkBike),
            }),
            travel_time_distribution: Some(bin_durations(&durations)),
            note: None,
        }
    }
}

/// Linear interpolation between closest ranks. The input must be sorted. None if it's empty.
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64))
}

/// Fixed-width bins from 0 to the max time. Durations outside are clipped into the end bins.
pub fn bin_durations(durations: &[f64]) -> TravelTimeHistogram {
    let num_bins = (MAX_TIME_MIN / BIN_WIDTH_MIN) as usize;
    let bin_edges_min = (0..=num_bins).map(|i| i as f64 * BIN_WIDTH_MIN).collect();
    let mut counts = vec![0; num_bins];
    for dur in durations {
        let clipped = dur.max(0.0).min(MAX_TIME_MIN);
        // The last bin is closed on the right
        let bin = ((clipped / BIN_WIDTH_MIN) as usize).min(num_bins - 1);
        counts[bin] += 1;
    }
    TravelTimeHistogram {
        bin_width_min: Some(BIN_WIDTH_MIN),
        max_time_min: Some(MAX_TIME_MIN),
        bin_edges_min,
        counts,
    }
}
