use confluence::{
    Schedule,
    gtfs::{Config, Gtfs},
};
use std::{
    fs,
    io::Write,
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// A throwaway directory of GTFS-shaped CSV tables, built up table-by-table
/// and ingested into a [`Schedule`]. Mirrors the fixture pattern used by
/// the in-crate resolver tests, generalized for reuse across integration
/// tests.
pub struct Fixture {
    dir: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut dir = std::env::temp_dir();
        dir.push(format!("confluence-fixture-{}-{id}", std::process::id()));
        fs::create_dir_all(&dir).expect("create fixture dir");
        Self { dir }
    }

    pub fn write(&self, name: &str, contents: &str) -> &Self {
        let mut file = fs::File::create(self.dir.join(name)).expect("create fixture file");
        file.write_all(contents.as_bytes()).expect("write fixture file");
        self
    }

    pub fn build(&self) -> Schedule {
        let mut gtfs = Gtfs::new().with_config(Config::default()).from_directory(&self.dir);
        Schedule::build(&mut gtfs).expect("build schedule from fixture")
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

pub const STOPS_HEADER: &str = "stop_id,stop_name,stop_lat,stop_lon,stop_desc,parent_station,location_type";
pub const ROUTES_HEADER: &str = "route_id,agency_id,route_short_name,route_long_name,route_type,route_desc";
pub const TRIPS_HEADER: &str = "route_id,trip_id,trip_headsign,direction_id,shape_id";
pub const STOP_TIMES_HEADER: &str = "trip_id,stop_id,stop_sequence,arrival_time,departure_time";
pub const PATHWAYS_HEADER: &str = "from_stop_id,to_stop_id,traversal_time";
pub const TRANSFERS_HEADER: &str = "from_stop_id,to_stop_id,min_transfer_time";
