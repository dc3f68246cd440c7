use widgetry::{Line, Text};

use facilities::{Route, Stop};
use model::{FlowOptions, FlowPrimitive, OdStats, TripPrimitive};

pub fn stop(stop: &Stop) -> Text {
    let mut txt = Text::from(
        stop.name
            .clone()
            .unwrap_or_else(|| "unnamed stop".to_string()),
    );
    if let Some(ref mode) = stop.raw_mode {
        txt.add_line(Line(format!("Mode: {mode}")));
    }
    txt
}

pub fn route(route: &Route) -> Text {
    Text::from(route.describe())
}

pub fn trip_primitive(primitive: &TripPrimitive) -> Text {
    Text::from_multiline(primitive.tooltip().into_iter().map(Line).collect())
}

pub fn flow(flow: &FlowPrimitive, opts: &FlowOptions) -> Text {
    let mut txt = Text::from(flow.describe(opts));
    if let Some(ref month) = opts.month {
        txt.add_line(Line(format!("Month: {month}")));
    }
    txt
}

pub fn stats(stats: Option<&OdStats>) -> Text {
    let mut lines = OdStats::summary_lines(stats).into_iter();
    let mut txt = Text::from(Line(lines.next().unwrap_or_default()).small_heading());
    for line in lines {
        txt.add_line(Line(line));
    }
    txt
}
