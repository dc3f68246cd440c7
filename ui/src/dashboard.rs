use widgetry::mapspace::{World, WorldOutcome};
use widgetry::{EventCtx, GfxCtx, Line, Outcome, Panel, State, Text, Widget};

use model::{Applied, HighlightEvent};

use crate::components::{controls, describe, histogram_widget};
use crate::layers::{make_world, Obj};
use crate::{App, Transition};

/// The only screen: selectors and stats on the left, every map layer underneath.
pub struct Dashboard {
    panel: Panel,
    world: World<Obj>,
}

impl Dashboard {
    pub fn new_state(ctx: &mut EventCtx, app: &App) -> Box<dyn State<App>> {
        let mut state = Self {
            panel: controls::panel(ctx, app),
            world: World::unbounded(),
        };
        state.on_data_change(ctx, app);
        Box::new(state)
    }

    fn on_data_change(&mut self, ctx: &mut EventCtx, app: &App) {
        self.panel.replace(ctx, "status", status_widget(ctx, app));
        let stats = app.session.data.as_ref().and_then(|d| d.stats.as_ref());
        self.panel
            .replace(ctx, "stats", describe::stats(stats).into_widget(ctx));
        self.panel
            .replace(ctx, "histogram", histogram_widget(ctx, stats));
        self.on_style_change(ctx, app);
    }

    fn on_style_change(&mut self, ctx: &mut EventCtx, app: &App) {
        self.world = make_world(ctx, app);
    }

    fn on_highlight_event(&mut self, ctx: &mut EventCtx, app: &mut App, event: HighlightEvent) {
        if app.session.on_highlight_event(event) {
            self.on_style_change(ctx, app);
        }
    }

    fn on_controls_change(&mut self, ctx: &mut EventCtx, app: &mut App) {
        let selection = controls::selection_from_panel(&self.panel);
        let view = controls::view_from_panel(&self.panel);

        if selection != app.selection {
            app.selection = selection;
            let applied = ctx.loading_screen("load trips", |_, _| app.load_selection());
            if let Applied::Updated {
                recenter: Some(bounds),
            } = applied
            {
                app.fit_bounds(ctx, &bounds);
            }
            app.view = view;
            self.on_data_change(ctx, app);
        } else if view != app.view {
            app.view = view;
            self.on_style_change(ctx, app);
        }
    }
}

impl State<App> for Dashboard {
    fn event(&mut self, ctx: &mut EventCtx, app: &mut App) -> Transition {
        match self.world.event(ctx) {
            WorldOutcome::ClickedObject(Obj::Trip(id)) => {
                let trip = app.session.geometry.get(id).trip().clone();
                self.on_highlight_event(ctx, app, HighlightEvent::ClickedTrip(trip));
            }
            WorldOutcome::ClickedFreeSpace(_) => {
                self.on_highlight_event(ctx, app, HighlightEvent::ClickedBackground);
            }
            _ => {}
        }

        match self.panel.event(ctx) {
            Outcome::Clicked(x) => match x.as_ref() {
                controls::RECENTER => match app.session.fitted_bounds.clone() {
                    Some(bounds) => app.fit_bounds(ctx, &bounds),
                    None => info!("Nothing loaded yet to recenter on"),
                },
                _ => unreachable!(),
            },
            Outcome::Changed(_) => {
                self.on_controls_change(ctx, app);
            }
            _ => {}
        }

        Transition::Keep
    }

    fn draw(&self, g: &mut GfxCtx, _: &App) {
        self.world.draw(g);
        self.panel.draw(g);
    }

    fn recreate(&mut self, ctx: &mut EventCtx, app: &mut App) -> Box<dyn State<App>> {
        Self::new_state(ctx, app)
    }
}

fn status_widget(ctx: &mut EventCtx, app: &App) -> Widget {
    Text::from(Line(&app.session.status).small()).into_widget(ctx)
}
