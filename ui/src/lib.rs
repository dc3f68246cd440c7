#[macro_use]
extern crate log;

mod components;
mod dashboard;
mod layers;

use std::collections::BTreeSet;
use std::path::PathBuf;

use abstutil::Timer;
use geom::{GPSBounds, LonLat};
use structopt::StructOpt;
use widgetry::{Color, EventCtx, GfxCtx, Settings, SharedAppState};

use facilities::{Facilities, FacilityLayer};
use model::{
    load_od, parse_records, tracts_in, Applied, DataSource, DayFilter, FlowOptions, LocalDir,
    MapSession, OdPair, OdRecord, OdSelection, Tract, OD_FLOWS_PATH,
};

/// Facility GeoJSON files live here, relative to the data directory
const FACILITIES_DIR: &str = "UTA";

#[derive(StructOpt)]
struct Args {
    /// The directory holding `UTA/`, `OD/`, and `samples/`
    #[structopt(long, default_value = "data")]
    data_dir: String,
    /// Census tract to select at startup
    #[structopt(long)]
    origin: Option<String>,
    #[structopt(long)]
    destination: Option<String>,
    /// Only keep trips starting on this day of the month, like 5 or 05
    #[structopt(long)]
    day: Option<String>,
    /// Recompute every `.stats.json` from its sample, then quit
    #[structopt(long)]
    rebuild_stats: bool,
}

impl Args {
    fn selection(&self) -> OdSelection {
        let day = match self.day.as_deref().map(DayFilter::parse) {
            None => DayFilter::None,
            Some(Ok(day)) => day,
            Some(Err(err)) => {
                warn!("Ignoring --day: {err}");
                DayFilter::None
            }
        };
        OdSelection {
            origin: self.origin.clone().map(Tract),
            destination: self.destination.clone().map(Tract),
            day,
        }
    }
}

fn run(settings: Settings) {
    abstutil::logger::setup();

    let args = Args::from_iter(abstutil::cli_args());

    if args.rebuild_stats {
        match LocalDir::new(&args.data_dir).rebuild_stats() {
            Ok(count) => info!("Rebuilt stats for {count} OD pairs"),
            Err(err) => error!("Couldn't rebuild stats: {err}"),
        }
        return;
    }

    widgetry::run(settings, move |ctx| {
        let mut app = ctx.loading_screen("load static data", |_, timer| App::load(&args, timer));
        app.setup_canvas(ctx);

        if let Applied::Updated {
            recenter: Some(bounds),
        } = app.load_selection()
        {
            app.fit_bounds(ctx, &bounds);
        }

        let states = vec![dashboard::Dashboard::new_state(ctx, &app)];
        (app, states)
    });
}

pub fn main() {
    let settings = Settings::new("Complete Trip Dashboard");
    run(settings);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Basemap {
    Light,
    Dark,
}

impl Basemap {
    pub fn background(self) -> Color {
        match self {
            Basemap::Light => Color::hex("#f3f4f6"),
            Basemap::Dark => Color::hex("#111827"),
        }
    }

    pub fn outline(self) -> Color {
        match self {
            Basemap::Light => Color::grey(0.4),
            Basemap::Dark => Color::grey(0.7),
        }
    }
}

/// Everything the user can toggle without loading new trip data
#[derive(Clone, Debug, PartialEq)]
pub struct ViewSettings {
    pub basemap: Basemap,
    pub facility_layers: BTreeSet<FacilityLayer>,
    pub show_flows: bool,
    pub show_tracts: bool,
    pub flow_options: FlowOptions,
}

impl ViewSettings {
    fn new() -> Self {
        Self {
            basemap: Basemap::Light,
            facility_layers: FacilityLayer::all().into_iter().collect(),
            show_flows: true,
            show_tracts: true,
            flow_options: FlowOptions::default(),
        }
    }
}

pub struct App {
    data: LocalDir,
    facilities: Facilities,
    od_records: Vec<OdRecord>,
    origins: Vec<Tract>,
    destinations: Vec<Tract>,
    /// Fixed for the whole session; every map coordinate is relative to this
    gps_bounds: GPSBounds,

    view: ViewSettings,
    selection: OdSelection,
    session: MapSession,
}

impl SharedAppState for App {
    fn draw_default(&self, g: &mut GfxCtx) {
        g.clear(self.view.basemap.background());
    }
}

pub type Transition = widgetry::Transition<App>;

impl App {
    // Every static input is optional. Failures are logged and the dashboard starts without them.
    fn load(args: &Args, timer: &mut Timer) -> Self {
        let data = LocalDir::new(&args.data_dir);

        timer.start("load facilities");
        let facilities_dir: PathBuf = data.root().join(FACILITIES_DIR);
        let facilities = match Facilities::load_from_dir(&facilities_dir) {
            Ok(facilities) => facilities,
            Err(err) => {
                warn!("Couldn't load facilities from {}: {err}", facilities_dir.display());
                Facilities::empty()
            }
        };
        timer.stop("load facilities");

        timer.start("load OD flows");
        let od_records = match data.fetch(OD_FLOWS_PATH).and_then(|raw| parse_records(&raw)) {
            Ok(records) => records,
            Err(err) => {
                warn!("Couldn't load {OD_FLOWS_PATH}: {err}");
                Vec::new()
            }
        };
        timer.stop("load OD flows");

        let pairs: Vec<OdPair> = match data.list_od_pairs() {
            Ok(pairs) => pairs,
            Err(err) => {
                warn!("Couldn't list OD samples: {err}");
                Vec::new()
            }
        };
        let (origins, destinations) = tracts_in(&pairs);
        info!(
            "Found {} OD pairs between {} origins and {} destinations",
            pairs.len(),
            origins.len(),
            destinations.len()
        );

        let gps_bounds = initial_gps_bounds(&facilities, &od_records);

        Self {
            data,
            facilities,
            od_records,
            origins,
            destinations,
            gps_bounds,

            view: ViewSettings::new(),
            selection: args.selection(),
            session: MapSession::new(),
        }
    }

    fn setup_canvas(&self, ctx: &mut EventCtx) {
        let bounds = self.gps_bounds.to_bounds();
        ctx.canvas.map_dims = (bounds.max_x, bounds.max_y);
        ctx.canvas.center_on_map_pt(bounds.center());
    }

    /// Fetches trips and stats for the current selection and hands them to the session. Loads
    /// are synchronous, but still go through the session's generation check.
    fn load_selection(&mut self) -> Applied {
        let generation = self.session.begin_load();
        let result = load_od(&self.data, &self.selection);
        let applied = self.session.apply(generation, result);
        info!("{}", self.session.status);
        applied
    }

    /// Zooms and pans so the bounds fill most of the screen.
    fn fit_bounds(&self, ctx: &mut EventCtx, bounds: &GPSBounds) {
        let pt1 = LonLat::new(bounds.min_lon, bounds.min_lat).to_pt(&self.gps_bounds);
        let pt2 = LonLat::new(bounds.max_lon, bounds.max_lat).to_pt(&self.gps_bounds);
        let bounds = geom::Bounds::from(&[pt1, pt2]);

        let zoom_x = ctx.canvas.window_width / bounds.width().max(1.0);
        let zoom_y = ctx.canvas.window_height / bounds.height().max(1.0);
        ctx.canvas.cam_zoom = 0.8 * zoom_x.min(zoom_y);
        ctx.canvas.center_on_map_pt(bounds.center());
    }
}

/// Covers the facilities and flows, falling back to the Salt Lake valley when neither loaded.
fn initial_gps_bounds(facilities: &Facilities, od_records: &[OdRecord]) -> GPSBounds {
    let mut bounds = GPSBounds::new();
    // The default view, centered near downtown Salt Lake City
    bounds.update(LonLat::new(-112.05, 40.6));
    bounds.update(LonLat::new(-111.75, 40.9));

    let facility_bounds = facilities.gps_bounds();
    if facility_bounds.min_lon <= facility_bounds.max_lon {
        bounds.update(LonLat::new(facility_bounds.min_lon, facility_bounds.min_lat));
        bounds.update(LonLat::new(facility_bounds.max_lon, facility_bounds.max_lat));
    }
    for record in od_records {
        for (lat, lon) in [(record.o_lat, record.o_lon), (record.d_lat, record.d_lon)] {
            if let (Some(lat), Some(lon)) = (lat, lon) {
                if lat.is_finite() && lon.is_finite() {
                    bounds.update(LonLat::new(lon, lat));
                }
            }
        }
    }
    bounds
}
