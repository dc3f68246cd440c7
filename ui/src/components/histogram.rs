use geom::Polygon;
use widgetry::{Color, EventCtx, GeomBatch, Line, Text, Widget};

use model::histogram::{layout_histogram, CanvasSize, HistogramLayout, Label};
use model::OdStats;

const WIDTH: f64 = 320.0;
const HEIGHT: f64 = 180.0;
const REFERENCE_LINE_WIDTH: f64 = 1.5;

/// Draws the travel time distribution from the stats, or a placeholder message when there's
/// nothing to show.
pub fn histogram_widget(ctx: &EventCtx, stats: Option<&OdStats>) -> Widget {
    // GeomBatch stays in logical pixels; widgetry applies the scale factor when drawing
    let canvas = CanvasSize {
        width: WIDTH,
        height: HEIGHT,
    };

    let measure = |txt: &str| render_label(ctx, txt).get_dims().width;
    let layout = layout_histogram(
        stats.and_then(|s| s.travel_time_distribution.as_ref()),
        stats.and_then(|s| s.trip_duration_min.as_ref()),
        canvas,
        &measure,
    );

    let mut batch = GeomBatch::new();
    batch.push(Color::WHITE, Polygon::rectangle(WIDTH, HEIGHT));
    match layout {
        HistogramLayout::Placeholder(label) => {
            draw_label(ctx, &mut batch, &label, Color::grey(0.4));
        }
        HistogramLayout::Chart {
            title,
            bars,
            lines,
            caption,
        } => {
            draw_label(ctx, &mut batch, &title, Color::BLACK);
            for bar in bars {
                if bar.height <= 0.0 {
                    continue;
                }
                // Leave a sliver between neighbors
                let width = (bar.width - 1.0).max(0.5);
                batch.push(
                    Color::hex("#60a5fa"),
                    Polygon::rectangle(width, bar.height).translate(bar.x, bar.y),
                );
            }
            for line in lines {
                let color = Color::hex(line.kind.color_hex());
                batch.push(
                    color,
                    Polygon::rectangle(REFERENCE_LINE_WIDTH, line.bottom - line.top)
                        .translate(line.x - REFERENCE_LINE_WIDTH / 2.0, line.top),
                );
                draw_label(ctx, &mut batch, &line.label, color);
            }
            draw_label(ctx, &mut batch, &caption, Color::grey(0.3));
        }
    }
    batch.into_widget(ctx)
}

fn render_label(ctx: &EventCtx, txt: &str) -> GeomBatch {
    Text::from(Line(txt).small()).render_autocropped(ctx)
}

fn draw_label(ctx: &EventCtx, batch: &mut GeomBatch, label: &Label, color: Color) {
    batch.append(
        Text::from(Line(&label.text).small().fg(color))
            .render_autocropped(ctx)
            .translate(label.x, label.y),
    );
}
