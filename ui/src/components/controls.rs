use widgetry::{
    Choice, EventCtx, HorizontalAlignment, Line, Panel, TextExt, Toggle, VerticalAlignment, Widget,
};

use facilities::FacilityLayer;
use model::{months, DayFilter, FlowOptions, OdSelection, Tract};

use crate::{App, Basemap, ViewSettings};

pub const FLOWS: &str = "OD flows";
pub const TRACTS: &str = "Tract outlines";
pub const LINKED: &str = "Count linked trips";
pub const RECENTER: &str = "Recenter on trips";

pub fn panel(ctx: &mut EventCtx, app: &App) -> Panel {
    Panel::new_builder(Widget::col(vec![
        Line("Complete Trip Dashboard").small_heading().into_widget(ctx),
        selection_controls(ctx, app).section(ctx),
        view_controls(ctx, app).section(ctx),
        Widget::placeholder(ctx, "status"),
        Widget::placeholder(ctx, "stats"),
        Widget::placeholder(ctx, "histogram"),
    ]))
    .aligned(HorizontalAlignment::Left, VerticalAlignment::Top)
    .build(ctx)
}

fn selection_controls(ctx: &mut EventCtx, app: &App) -> Widget {
    let mut day_choices = vec![Choice::new("all days", DayFilter::None)];
    for day in 1..=31 {
        day_choices.push(Choice::new(format!("{day:02}"), DayFilter::DayOfMonth(day)));
    }

    Widget::col(vec![
        Widget::row(vec![
            "Origin:".text_widget(ctx),
            Widget::dropdown(
                ctx,
                "origin",
                app.selection.origin.clone(),
                tract_choices(&app.origins, &app.selection.origin),
            ),
        ]),
        Widget::row(vec![
            "Destination:".text_widget(ctx),
            Widget::dropdown(
                ctx,
                "destination",
                app.selection.destination.clone(),
                tract_choices(&app.destinations, &app.selection.destination),
            ),
        ]),
        Widget::row(vec![
            "Day:".text_widget(ctx),
            Widget::dropdown(ctx, "day", app.selection.day, day_choices),
        ]),
        ctx.style().btn_outline.text(RECENTER).build_def(ctx),
    ])
}

// The current value must be one of the choices, even if it came from the command line and has no
// sample
fn tract_choices(tracts: &[Tract], current: &Option<Tract>) -> Vec<Choice<Option<Tract>>> {
    let mut choices = vec![Choice::new("none", None)];
    for tract in tracts {
        choices.push(Choice::new(tract.0.clone(), Some(tract.clone())));
    }
    if let Some(tract) = current {
        if !tracts.contains(tract) {
            choices.push(Choice::new(tract.0.clone(), Some(tract.clone())));
        }
    }
    choices
}

fn view_controls(ctx: &mut EventCtx, app: &App) -> Widget {
    let view = &app.view;
    let mut col = vec![Widget::row(vec![
        "Basemap:".text_widget(ctx),
        Widget::dropdown(
            ctx,
            "basemap",
            view.basemap,
            vec![
                Choice::new("light", Basemap::Light),
                Choice::new("dark", Basemap::Dark),
            ],
        ),
    ])];

    for layer in FacilityLayer::all() {
        col.push(Toggle::checkbox(
            ctx,
            layer.label(),
            None,
            view.facility_layers.contains(&layer),
        ));
    }
    col.push(Toggle::checkbox(ctx, TRACTS, None, view.show_tracts));
    col.push(Toggle::checkbox(ctx, FLOWS, None, view.show_flows));

    let mut month_choices = vec![Choice::new("all months", None)];
    let available = months(&app.od_records);
    for month in &available {
        month_choices.push(Choice::new(month.clone(), Some(month.clone())));
    }
    if let Some(ref month) = view.flow_options.month {
        if !available.contains(month) {
            month_choices.push(Choice::new(month.clone(), Some(month.clone())));
        }
    }
    col.push(Widget::row(vec![
        "Flow month:".text_widget(ctx),
        Widget::dropdown(
            ctx,
            "flow month",
            view.flow_options.month.clone(),
            month_choices,
        ),
    ]));
    col.push(Toggle::checkbox(
        ctx,
        LINKED,
        None,
        view.flow_options.use_linked,
    ));

    Widget::col(col)
}

pub fn selection_from_panel(panel: &Panel) -> OdSelection {
    OdSelection {
        origin: panel.dropdown_value("origin"),
        destination: panel.dropdown_value("destination"),
        day: panel.dropdown_value("day"),
    }
}

pub fn view_from_panel(panel: &Panel) -> ViewSettings {
    ViewSettings {
        basemap: panel.dropdown_value("basemap"),
        facility_layers: FacilityLayer::all()
            .into_iter()
            .filter(|layer| panel.is_checked(layer.label()))
            .collect(),
        show_flows: panel.is_checked(FLOWS),
        show_tracts: panel.is_checked(TRACTS),
        flow_options: FlowOptions {
            month: panel.dropdown_value("flow month"),
            use_linked: panel.is_checked(LINKED),
        },
    }
}
