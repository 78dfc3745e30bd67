/// File-name overrides for the six logical tables a feed is expected to
/// carry. Defaults match the standard GTFS file names.
#[derive(Debug, Clone)]
pub struct Config {
    pub stops_path: String,
    pub stop_times_path: String,
    pub trips_path: String,
    pub routes_path: String,
    pub pathways_path: String,
    pub transfers_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stops_path: "stops.txt".into(),
            stop_times_path: "stop_times.txt".into(),
            trips_path: "trips.txt".into(),
            routes_path: "routes.txt".into(),
            pathways_path: "pathways.txt".into(),
            transfers_path: "transfers.txt".into(),
        }
    }
}
