use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use abstutil::prettyprint_usize;
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{DayFilter, LinkedTrip, OdStats, OdTracts, SampleDocument};

pub const SAMPLES_DIR: &str = "samples";
pub const OD_FLOWS_PATH: &str = "OD/od_dashboard_topk.json";

/// A census tract ID
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tract(pub String);

impl fmt::Display for Tract {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OdPair {
    pub origin: Tract,
    pub destination: Tract,
}

impl OdPair {
    pub fn key(&self) -> String {
        format!("{}_to_{}", self.origin, self.destination)
    }

    pub fn sample_path(&self) -> String {
        format!("{SAMPLES_DIR}/{}.json", self.key())
    }

    pub fn stats_path(&self) -> String {
        format!("{SAMPLES_DIR}/{}.stats.json", self.key())
    }

    pub fn is_intra_tract(&self) -> bool {
        self.origin == self.destination
    }

    /// Parses `{origin}_to_{destination}.json`. Statistics files and anything else are None.
    pub fn from_sample_filename(name: &str) -> Option<Self> {
        let key = name.strip_suffix(".json")?;
        if key.ends_with(".stats") {
            return None;
        }
        let (origin, destination) = key.split_once("_to_")?;
        if origin.is_empty() || destination.is_empty() {
            return None;
        }
        Some(Self {
            origin: Tract(origin.to_string()),
            destination: Tract(destination.to_string()),
        })
    }
}

/// Where the static JSON documents come from. Paths are relative to the data root.
pub trait DataSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>>;
}

/// A data directory on the local filesystem
pub struct LocalDir {
    root: PathBuf,
}

impl LocalDir {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every OD pair with a sample file, sorted
    pub fn list_od_pairs(&self) -> Result<Vec<OdPair>> {
        let mut pairs = BTreeSet::new();
        for entry in fs_err::read_dir(self.root.join(SAMPLES_DIR))? {
            let entry = entry?;
            if let Some(pair) = entry
                .file_name()
                .to_str()
                .and_then(OdPair::from_sample_filename)
            {
                pairs.insert(pair);
            }
        }
        Ok(pairs.into_iter().collect())
    }

    /// Regenerates every statistics document from its sample file. Returns how many were written.
    pub fn rebuild_stats(&self) -> Result<usize> {
        let pairs = self.list_od_pairs()?;
        for pair in &pairs {
            let doc = parse_sample(&self.fetch(&pair.sample_path())?)?;
            let stats = OdStats::from_trips(&doc.linked_trips);
            fs_err::write(
                self.root.join(pair.stats_path()),
                serde_json::to_string_pretty(&stats)?,
            )?;
            info!(
                "Wrote stats for {} linked trips to {}",
                prettyprint_usize(stats.counts.linked_trips),
                pair.stats_path()
            );
        }
        Ok(pairs.len())
    }
}

impl DataSource for LocalDir {
    fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs_err::read(self.root.join(path))?)
    }
}

/// Distinct origins and destinations across all pairs, for populating the selectors
pub fn tracts_in(pairs: &[OdPair]) -> (Vec<Tract>, Vec<Tract>) {
    let origins: BTreeSet<Tract> = pairs.iter().map(|p| p.origin.clone()).collect();
    let destinations: BTreeSet<Tract> = pairs.iter().map(|p| p.destination.clone()).collect();
    (
        origins.into_iter().collect(),
        destinations.into_iter().collect(),
    )
}

#[derive(Clone, Debug, PartialEq)]
pub struct OdSelection {
    pub origin: Option<Tract>,
    pub destination: Option<Tract>,
    pub day: DayFilter,
}

impl OdSelection {
    pub fn new() -> Self {
        Self {
            origin: None,
            destination: None,
            day: DayFilter::None,
        }
    }

    /// None until both tracts are chosen
    pub fn pair(&self) -> Option<OdPair> {
        let origin = self.origin.as_ref().filter(|t| !t.0.is_empty())?;
        let destination = self.destination.as_ref().filter(|t| !t.0.is_empty())?;
        Some(OdPair {
            origin: origin.clone(),
            destination: destination.clone(),
        })
    }
}

impl Default for OdSelection {
    fn default() -> Self {
        Self::new()
    }
}

pub struct OdData {
    pub pair: OdPair,
    pub day: DayFilter,
    /// After the day filter
    pub trips: Vec<LinkedTrip>,
    /// Before the day filter
    pub total_trips: usize,
    pub tracts: Option<OdTracts>,
    /// Missing statistics don't stop the trips from being drawn
    pub stats: Option<OdStats>,
}

pub enum LoadOutcome {
    /// Origin or destination not chosen yet. Nothing was fetched.
    Incomplete,
    Loaded(OdData),
}

impl LoadOutcome {
    pub fn status(&self) -> String {
        match self {
            LoadOutcome::Incomplete => "Select an origin and a destination tract".to_string(),
            LoadOutcome::Loaded(data) => {
                let mut status = if data.pair.is_intra_tract() {
                    format!(
                        "Origin and destination are the same tract ({}). ",
                        data.pair.origin
                    )
                } else {
                    String::new()
                };
                status.push_str(&format!(
                    "{} linked trip{} loaded for {} to {}",
                    prettyprint_usize(data.trips.len()),
                    if data.trips.len() == 1 { "" } else { "s" },
                    data.pair.origin,
                    data.pair.destination
                ));
                if data.day != DayFilter::None {
                    status.push_str(&format!(
                        " on {} ({} before filtering)",
                        data.day.describe(),
                        prettyprint_usize(data.total_trips)
                    ));
                }
                if data.stats.is_none() {
                    status.push_str("; no statistics available");
                }
                status
            }
        }
    }
}

pub fn parse_sample(raw: &[u8]) -> Result<SampleDocument> {
    Ok(serde_json::from_slice(raw)?)
}

/// The trip sample is required; the statistics document is optional.
pub fn load_od(source: &dyn DataSource, selection: &OdSelection) -> Result<LoadOutcome> {
    let pair = match selection.pair() {
        Some(pair) => pair,
        None => return Ok(LoadOutcome::Incomplete),
    };
    if pair.is_intra_tract() {
        info!("{} is an intra-tract selection", pair.key());
    }

    let trips_result = source
        .fetch(&pair.sample_path())
        .and_then(|raw| parse_sample(&raw));
    let stats_result = source
        .fetch(&pair.stats_path())
        .and_then(|raw| Ok(serde_json::from_slice::<OdStats>(&raw)?));

    let doc = trips_result.map_err(|err| anyhow!("Couldn't load {}: {err}", pair.sample_path()))?;
    let stats = match stats_result {
        Ok(stats) => Some(stats),
        Err(err) => {
            warn!("No statistics for {}: {err}", pair.key());
            None
        }
    };

    let total_trips = doc.linked_trips.len();
    let trips = selection.day.apply(doc.linked_trips);
    info!(
        "Loaded {} of {} linked trips for {}",
        prettyprint_usize(trips.len()),
        prettyprint_usize(total_trips),
        pair.key()
    );

    Ok(LoadOutcome::Loaded(OdData {
        pair,
        day: selection.day,
        trips,
        total_trips,
        tracts: doc.od,
        stats,
    }))
}
