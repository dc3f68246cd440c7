use geom::{Circle, Distance, GPSBounds, LonLat, PolyLine, Pt2D};
use widgetry::mapspace::{ObjectID, World};
use widgetry::tools::ColorScale;
use widgetry::{Color, EventCtx, GeomBatch};

use facilities::FacilityMode;
use model::{
    build_flow_curves, max_count, Emphasis, FlowPrimitive, PrimitiveID, TripPrimitive,
};

use crate::components::describe;
use crate::App;

// TODO Styles are in screen pixels, but we draw in map-space. Use unzoomed rendering once the
// world supports it.
const METERS_PER_PIXEL: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Obj {
    Trip(PrimitiveID),
    Flow(usize),
    Stop(usize),
    /// Route index, then which piece of the route
    Route(usize, usize),
}
impl ObjectID for Obj {}

/// Builds every visible layer. Later layers draw on top.
pub fn make_world(ctx: &mut EventCtx, app: &App) -> World<Obj> {
    let mut world = World::unbounded();

    if app.view.show_tracts {
        world.draw_master_batch(ctx, tract_outlines(app));
    }
    add_routes(ctx, app, &mut world);
    if app.view.show_flows {
        add_flows(ctx, app, &mut world);
    }
    add_stops(ctx, app, &mut world);
    add_trips(ctx, app, &mut world);

    world.initialize_hover(ctx);
    world
}

fn px(pixels: f64) -> Distance {
    Distance::meters(pixels * METERS_PER_PIXEL)
}

fn to_pts(pts: &[LonLat], gps_bounds: &GPSBounds) -> Vec<Pt2D> {
    Pt2D::approx_dedupe(
        pts.iter().map(|pt| pt.to_pt(gps_bounds)).collect(),
        Distance::meters(0.1),
    )
}

fn tract_outlines(app: &App) -> GeomBatch {
    let mut batch = GeomBatch::new();
    let tracts = match app.session.data.as_ref().and_then(|d| d.tracts.as_ref()) {
        Some(tracts) => tracts,
        None => {
            return batch;
        }
    };
    let color = app.view.basemap.outline();
    for area in [&tracts.origin, &tracts.destination] {
        for ring in area.outline() {
            if let Ok(pl) = PolyLine::new(to_pts(&ring, &app.gps_bounds)) {
                batch.push(color, pl.make_polygons(px(1.5)));
            }
        }
    }
    batch
}

fn add_routes(ctx: &mut EventCtx, app: &App, world: &mut World<Obj>) {
    for (idx, route) in app.facilities.routes.iter().enumerate() {
        if !app.view.facility_layers.contains(&route.layer()) {
            continue;
        }
        let (color, width) = match route.mode {
            FacilityMode::Bus => (Color::hex("#2563eb").alpha(0.5), 2.0),
            FacilityMode::Rail => (Color::hex("#7c3aed").alpha(0.7), 3.0),
        };

        for (piece, line) in route.lines.iter().enumerate() {
            let pl = match PolyLine::new(to_pts(line, &app.gps_bounds)) {
                Ok(pl) => pl,
                Err(err) => {
                    debug!("Skipping part of route {}: {err}", route.describe());
                    continue;
                }
            };
            world
                .add(Obj::Route(idx, piece))
                .hitbox(pl.make_polygons(px(width)))
                .draw_color(color)
                // Routes overlap heavily, so don't bother drawing a hover effect
                .invisibly_hoverable()
                .tooltip(describe::route(route))
                .build(ctx);
        }
    }
}

fn add_flows(ctx: &mut EventCtx, app: &App, world: &mut World<Obj>) {
    let opts = &app.view.flow_options;
    let max = max_count(&app.od_records, opts);
    let scale = ColorScale::from_colorous(colorous::COOL);

    for (idx, flow) in build_flow_curves(&app.od_records, opts)
        .into_iter()
        .enumerate()
    {
        let color = scale.eval((flow.count() / max).clamp(0.0, 1.0)).alpha(0.6);
        let polygon = match flow {
            FlowPrimitive::Curve { ref pts, weight, .. } => {
                match PolyLine::new(to_pts(pts, &app.gps_bounds)) {
                    Ok(pl) => pl.make_polygons(px(weight)),
                    Err(err) => {
                        debug!("Skipping degenerate flow: {err}");
                        continue;
                    }
                }
            }
            FlowPrimitive::IntraTract { center, radius, .. } => {
                Circle::new(center.to_pt(&app.gps_bounds), px(radius)).to_polygon()
            }
        };

        world
            .add(Obj::Flow(idx))
            .hitbox(polygon)
            .draw_color(color)
            .hover_alpha(0.9)
            .tooltip(describe::flow(&flow, opts))
            .build(ctx);
    }
}

fn add_stops(ctx: &mut EventCtx, app: &App, world: &mut World<Obj>) {
    // Optimization
    let bus_circle = Circle::new(Pt2D::zero(), px(2.5)).to_polygon();
    let rail_circle = Circle::new(Pt2D::zero(), px(4.0)).to_polygon();

    for (idx, stop) in app.facilities.stops.iter().enumerate() {
        if !app.view.facility_layers.contains(&stop.layer()) {
            continue;
        }
        let (color, circle) = match stop.mode {
            FacilityMode::Bus => (Color::hex("#1d4ed8"), &bus_circle),
            FacilityMode::Rail => (Color::hex("#6d28d9"), &rail_circle),
        };
        let pt = stop.pos.to_pt(&app.gps_bounds);

        world
            .add(Obj::Stop(idx))
            .hitbox(circle.translate(pt.x(), pt.y()))
            .draw_color(color)
            .hover_alpha(0.5)
            .tooltip(describe::stop(stop))
            .build(ctx);
    }
}

fn add_trips(ctx: &mut EventCtx, app: &App, world: &mut World<Obj>) {
    let geometry = &app.session.geometry;
    let emphasis = app.session.emphasis();

    // Legs first, so markers stay on top
    let mut order: Vec<usize> = (0..geometry.primitives.len()).collect();
    order.sort_by_key(|idx| matches!(geometry.primitives[*idx], TripPrimitive::Marker { .. }));

    for idx in order {
        let primitive = &geometry.primitives[idx];
        let style = emphasis
            .get(idx)
            .copied()
            .unwrap_or(Emphasis::Neutral)
            .style();
        let color = Color::hex(primitive.color_hex()).alpha(style.opacity as f32);

        let polygon = match primitive {
            TripPrimitive::Marker { pos, .. } => {
                Circle::new(pos.to_pt(&app.gps_bounds), px(style.marker_radius)).to_polygon()
            }
            TripPrimitive::Leg { pts, .. } => match PolyLine::new(to_pts(pts, &app.gps_bounds)) {
                Ok(pl) => pl.make_polygons(px(style.line_weight)),
                Err(err) => {
                    debug!("Skipping leg of trip {}: {err}", primitive.trip());
                    continue;
                }
            },
        };

        world
            .add(Obj::Trip(PrimitiveID(idx)))
            .hitbox(polygon)
            .draw_color(color)
            .hover_alpha(0.5)
            .tooltip(describe::trip_primitive(primitive))
            .clickable()
            .build(ctx);
    }
}
