//! Lays out the travel time histogram in logical (CSS-like) pixels. The caller draws it.

use crate::{DurationStats, TravelTimeHistogram};

/// Room for the title and the reference line labels
pub const TOP_MARGIN: f64 = 40.0;
/// Room for the x-axis caption
pub const BOTTOM_MARGIN: f64 = 20.0;
/// Labels never start left of this
pub const LEFT_SAFE_MARGIN: f64 = 4.0;
const LABEL_GAP: f64 = 4.0;
const TITLE: &str = "Travel time distribution";
const PLACEHOLDER: &str = "No distribution available";

/// In logical pixels. The renderer maps these to device pixels, so layout never sees the scale
/// factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

/// Top-left corner of some text
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub count: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceKind {
    Median,
    Mean,
}

impl ReferenceKind {
    pub fn color_hex(self) -> &'static str {
        match self {
            ReferenceKind::Median => "#111827",
            ReferenceKind::Mean => "#dc2626",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceLine {
    pub kind: ReferenceKind,
    pub x: f64,
    pub top: f64,
    pub bottom: f64,
    pub label: Label,
}

#[derive(Clone, Debug, PartialEq)]
pub enum HistogramLayout {
    Placeholder(Label),
    Chart {
        title: Label,
        bars: Vec<Bar>,
        lines: Vec<ReferenceLine>,
        caption: Label,
    },
}

/// `measure` returns the logical width of some text.
pub fn layout_histogram(
    hist: Option<&TravelTimeHistogram>,
    stats: Option<&DurationStats>,
    canvas: CanvasSize,
    measure: &dyn Fn(&str) -> f64,
) -> HistogramLayout {
    let hist = match hist {
        Some(h) if h.is_drawable() => h,
        _ => {
            let width = measure(PLACEHOLDER);
            return HistogramLayout::Placeholder(Label {
                text: PLACEHOLDER.to_string(),
                x: ((canvas.width - width) / 2.0).max(LEFT_SAFE_MARGIN),
                y: canvas.height / 2.0,
            });
        }
    };

    let chart_top = TOP_MARGIN;
    let chart_bottom = (canvas.height - BOTTOM_MARGIN).max(chart_top);
    let chart_height = chart_bottom - chart_top;

    let max_count = hist.counts.iter().cloned().max().unwrap_or(0).max(1) as f64;
    let bar_width = canvas.width / hist.counts.len() as f64;
    let bars = hist
        .counts
        .iter()
        .enumerate()
        .map(|(idx, count)| {
            let height = chart_height * (*count as f64) / max_count;
            Bar {
                x: idx as f64 * bar_width,
                y: chart_bottom - height,
                width: bar_width,
                height,
                count: *count,
            }
        })
        .collect();

    // is_drawable guarantees at least two edges
    let first = hist.bin_edges_min[0];
    let last = hist.bin_edges_min[hist.bin_edges_min.len() - 1];

    let mut lines = Vec::new();
    if let Some(stats) = stats {
        // Each label gets its own row under the title, so they can't collide with each other
        for (kind, value, row_y) in [
            (ReferenceKind::Median, stats.median, 16.0),
            (ReferenceKind::Mean, stats.mean, 28.0),
        ] {
            if !value.is_finite() {
                continue;
            }
            let x = value_to_x(value, first, last, canvas.width);
            let text = match kind {
                ReferenceKind::Median => format!("Median {value:.1} min"),
                ReferenceKind::Mean => format!("Mean {value:.1} min"),
            };
            let label_x = place_label(x, measure(&text), canvas.width);
            lines.push(ReferenceLine {
                kind,
                x,
                top: chart_top,
                bottom: chart_bottom,
                label: Label {
                    text,
                    x: label_x,
                    y: row_y,
                },
            });
        }
    }

    HistogramLayout::Chart {
        title: Label {
            text: TITLE.to_string(),
            x: LEFT_SAFE_MARGIN,
            y: 0.0,
        },
        bars,
        lines,
        caption: Label {
            text: format!("Trip duration (min), {first:.0} - {last:.0}"),
            x: LEFT_SAFE_MARGIN,
            y: chart_bottom + 4.0,
        },
    }
}

/// Linear from [first, last] to [0, width], clamped to the domain.
pub fn value_to_x(value: f64, first: f64, last: f64, width: f64) -> f64 {
    if last <= first {
        return 0.0;
    }
    ((value - first) / (last - first)).clamp(0.0, 1.0) * width
}

// Right of the line by default, flipped left if that would overflow, then kept off the left edge
fn place_label(line_x: f64, label_width: f64, canvas_width: f64) -> f64 {
    let mut x = line_x + LABEL_GAP;
    if x + label_width > canvas_width {
        x = line_x - LABEL_GAP - label_width;
    }
    x.max(LEFT_SAFE_MARGIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> CanvasSize {
        CanvasSize {
            width: 300.0,
            height: 160.0,
        }
    }

    fn hist() -> TravelTimeHistogram {
        TravelTimeHistogram {
            bin_width_min: Some(10.0),
            max_time_min: Some(30.0),
            bin_edges_min: vec![0.0, 10.0, 20.0, 30.0],
            counts: vec![2, 5, 3],
        }
    }

    fn stats(median: f64, mean: f64) -> DurationStats {
        DurationStats {
            min: None,
            mean,
            p25: 5.0,
            median,
            p75: 25.0,
            max: None,
        }
    }

    // 6 logical pixels per character
    fn measure(txt: &str) -> f64 {
        6.0 * txt.len() as f64
    }

    #[test]
    fn bars_and_reference_lines() {
        let layout = layout_histogram(Some(&hist()), Some(&stats(12.0, 14.0)), canvas(), &measure);
        let (bars, lines) = match layout {
            HistogramLayout::Chart { bars, lines, .. } => (bars, lines),
            x => panic!("expected a chart, got {:?}", x),
        };

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[1].x, 100.0);
        assert_eq!(bars[1].width, 100.0);
        let chart_height = 160.0 - BOTTOM_MARGIN - TOP_MARGIN;
        assert_eq!(bars[1].height, chart_height);
        assert_eq!(bars[0].height, chart_height * 2.0 / 5.0);
        assert_eq!(bars[0].y + bars[0].height, 160.0 - BOTTOM_MARGIN);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].kind, ReferenceKind::Median);
        assert_eq!(lines[0].x, ((12.0 - 0.0) / (30.0 - 0.0)) * 300.0);
        assert_eq!(lines[1].kind, ReferenceKind::Mean);
        assert!((lines[1].x - 140.0).abs() < 1e-9);
        assert_eq!(lines[1].label.text, "Mean 14.0 min");
        assert!((lines[1].label.x - 144.0).abs() < 1e-9);
        assert_ne!(lines[0].label.y, lines[1].label.y);
    }

    #[test]
    fn label_flips_and_clamps() {
        // The mean sits near the right edge, so its label flips left
        let layout = layout_histogram(Some(&hist()), Some(&stats(1.0, 29.0)), canvas(), &measure);
        let lines = match layout {
            HistogramLayout::Chart { lines, .. } => lines,
            x => panic!("expected a chart, got {:?}", x),
        };
        let mean = &lines[1];
        let width = measure(&mean.label.text);
        assert!((mean.x - 290.0).abs() < 1e-9);
        assert!((mean.label.x - (290.0 - 4.0 - width)).abs() < 1e-9);
        assert!(mean.label.x + width < 300.0);

        // A canvas too narrow for either side pins the label to the safe margin
        let narrow = CanvasSize {
            width: 60.0,
            height: 160.0,
        };
        let layout = layout_histogram(Some(&hist()), Some(&stats(15.0, 15.0)), narrow, &measure);
        match layout {
            HistogramLayout::Chart { lines, .. } => {
                assert_eq!(lines[1].label.x, LEFT_SAFE_MARGIN);
            }
            x => panic!("expected a chart, got {:?}", x),
        }
    }

    #[test]
    fn reference_lines_clamp_to_domain() {
        assert_eq!(value_to_x(-5.0, 0.0, 30.0, 300.0), 0.0);
        assert_eq!(value_to_x(45.0, 0.0, 30.0, 300.0), 300.0);
        assert_eq!(value_to_x(10.0, 10.0, 10.0, 300.0), 0.0);
    }

    #[test]
    fn placeholder_without_distribution() {
        for hist in [
            None,
            Some(TravelTimeHistogram {
                bin_width_min: None,
                max_time_min: None,
                bin_edges_min: vec![],
                counts: vec![],
            }),
        ] {
            match layout_histogram(hist.as_ref(), Some(&stats(1.0, 2.0)), canvas(), &measure) {
                HistogramLayout::Placeholder(label) => {
                    assert_eq!(label.text, "No distribution available");
                    assert_eq!(label.y, 80.0);
                }
                x => panic!("expected a placeholder, got {:?}", x),
            }
        }
    }

    #[test]
    fn no_stats_no_lines() {
        match layout_histogram(Some(&hist()), None, canvas(), &measure) {
            HistogramLayout::Chart { lines, caption, .. } => {
                assert!(lines.is_empty());
                assert_eq!(caption.text, "Trip duration (min), 0 - 30");
            }
            x => panic!("expected a chart, got {:?}", x),
        }
    }
}
