pub mod entities;
pub mod grid;
pub mod resolver;

pub use entities::*;

use crate::{
    gtfs::{self, Gtfs},
    shared::{Coordinate, Time},
};
use rayon::prelude::*;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Instant,
};
use tracing::debug;

/// A read-only, memory-efficient in-memory transit schedule. Built once per
/// feed load; every lookup a search driver performs afterwards is O(1)
/// array indexing against dense integer indices, never a string-keyed map
/// lookup in the hot path (see `SPEC_FULL.md` §3).
#[derive(Debug, Default)]
pub struct Schedule {
    pub stops: Box<[Stop]>,
    pub stations: Box<[Station]>,
    pub routes: Box<[Route]>,
    pub trips: Box<[Trip]>,
    /// Sorted by `(trip_idx, sequence)`; a trip's rows are a contiguous
    /// slice described by `trip_to_stop_slice`.
    pub stop_times: Box<[StopTime]>,

    stop_lookup: HashMap<Arc<str>, u32>,
    station_lookup: HashMap<Arc<str>, u32>,
    route_lookup: HashMap<Arc<str>, u32>,
    trip_lookup: HashMap<Arc<str>, u32>,

    trip_to_stop_slice: Box<[StopTimeSlice]>,
    /// `stop_idx -> [index into stop_times]`, sorted ascending by
    /// `departure_sec`. This is `rowsAtStop` from §4.1.
    rows_at_stop: Box<[Box<[u32]>]>,
    station_to_platforms: Box<[Box<[u32]>]>,
    walk_edges: Box<[Box<[WalkEdge]>]>,
    provided_pairs: HashSet<(u32, u32)>,
    grid: HashMap<grid::Cell, Box<[u32]>>,
    /// Sorted by `(popularity desc, name asc)`; consulted by the station
    /// resolver (C8).
    pub(crate) station_search_list: Box<[StationSearchEntry]>,
}

impl Schedule {
    /// Ingests the six logical tables from `gtfs` and builds the query
    /// structures above. A pure function of the streamed rows: calling it
    /// twice on an unchanged feed yields identically-built schedules, which
    /// is what "idempotent ingestion" (spec invariant 10) means for a
    /// value type with no mutable global state.
    pub fn build(gtfs: &mut Gtfs) -> Result<Self, gtfs::Error> {
        let (stops, stop_lookup) = load_stops(gtfs)?;
        let (stations, station_lookup, station_to_platforms, stop_station_idx) =
            derive_stations(&stops, &stop_lookup);
        let stops = attach_station_idx(stops, &stop_station_idx);

        let (routes, route_lookup) = load_routes(gtfs)?;
        let (trips, trip_lookup) = load_trips(gtfs, &route_lookup)?;
        let (stop_times, trip_to_stop_slice, rows_at_stop) =
            load_stop_times(gtfs, &stop_lookup, &trip_lookup, trips.len(), stops.len())?;
        let (walk_edges, provided_pairs) = load_walks(gtfs, &stop_lookup, stops.len())?;
        let grid = grid::build_grid(&stops);
        let station_search_list = build_station_search_list(&stations, &station_to_platforms, &rows_at_stop);

        Ok(Self {
            stops: stops.into_boxed_slice(),
            stations: stations.into_boxed_slice(),
            routes: routes.into_boxed_slice(),
            trips: trips.into_boxed_slice(),
            stop_times: stop_times.into_boxed_slice(),
            stop_lookup,
            station_lookup,
            route_lookup,
            trip_lookup,
            trip_to_stop_slice: trip_to_stop_slice.into_boxed_slice(),
            rows_at_stop: rows_at_stop.into_iter().map(Vec::into_boxed_slice).collect(),
            station_to_platforms: station_to_platforms
                .into_iter()
                .map(Vec::into_boxed_slice)
                .collect(),
            walk_edges: walk_edges.into_iter().map(Vec::into_boxed_slice).collect(),
            provided_pairs,
            grid,
            station_search_list: station_search_list.into_boxed_slice(),
        })
    }

    pub fn stop(&self, idx: u32) -> &Stop {
        &self.stops[idx as usize]
    }

    pub fn station(&self, idx: u32) -> &Station {
        &self.stations[idx as usize]
    }

    pub fn route(&self, idx: u32) -> &Route {
        &self.routes[idx as usize]
    }

    pub fn trip(&self, idx: u32) -> &Trip {
        &self.trips[idx as usize]
    }

    pub fn stop_by_id(&self, id: &str) -> Option<u32> {
        self.stop_lookup.get(id).copied()
    }

    pub fn station_by_id(&self, id: &str) -> Option<u32> {
        self.station_lookup.get(id).copied()
    }

    pub fn station_platforms(&self, station_idx: u32) -> &[u32] {
        &self.station_to_platforms[station_idx as usize]
    }

    /// `rowsAtStop(stop_id)`: stop-time rows at this stop, sorted ascending
    /// by departure time.
    pub fn rows_at_stop(&self, stop_idx: u32) -> impl Iterator<Item = &StopTime> {
        self.rows_at_stop[stop_idx as usize]
            .iter()
            .map(move |&i| &self.stop_times[i as usize])
    }

    /// `tripGroup(trip_id)`: every stop-time row of this trip, in
    /// ascending `stop_sequence` order.
    pub fn trip_stop_times(&self, trip_idx: u32) -> &[StopTime] {
        let slice = self.trip_to_stop_slice[trip_idx as usize];
        let start = slice.start_idx as usize;
        &self.stop_times[start..start + slice.count as usize]
    }

    pub fn walk_edges(&self, stop_idx: u32) -> &[WalkEdge] {
        &self.walk_edges[stop_idx as usize]
    }

    pub fn is_provided_pair(&self, from: u32, to: u32) -> bool {
        self.provided_pairs.contains(&(from, to))
    }

    pub fn grid(&self) -> &HashMap<grid::Cell, Box<[u32]>> {
        &self.grid
    }
}

fn load_stops(gtfs: &mut Gtfs) -> Result<(Vec<Stop>, HashMap<Arc<str>, u32>), gtfs::Error> {
    debug!("loading stops...");
    let now = Instant::now();
    let mut stops = Vec::new();
    let mut lookup = HashMap::new();
    gtfs.stream_stops(|(i, row)| {
        let id: Arc<str> = row.stop_id.into();
        lookup.insert(id.clone(), i as u32);
        stops.push(Stop {
            index: i as u32,
            id,
            name: row.stop_name.into(),
            coordinate: Coordinate::from((row.stop_lat, row.stop_lon)),
            location_type: row.location_type.unwrap_or(0),
            parent_station: row.parent_station.map(Arc::from),
            station_idx: u32::MAX,
        });
    })?;
    debug!("loaded {} stops in {:?}", stops.len(), now.elapsed());
    Ok((stops, lookup))
}

/// Derives §3's `stopIdToStationId` / `stationToPlatforms` / canonical name
/// rule from each stop's raw `parent_station`.
fn derive_stations(
    stops: &[Stop],
    stop_lookup: &HashMap<Arc<str>, u32>,
) -> (Vec<Station>, HashMap<Arc<str>, u32>, Vec<Vec<u32>>, Vec<u32>) {
    let mut station_lookup: HashMap<Arc<str>, u32> = HashMap::new();
    let mut station_keys: Vec<Arc<str>> = Vec::new();
    let mut stop_station_idx = vec![0u32; stops.len()];

    for stop in stops {
        let key = stop.parent_station.clone().unwrap_or_else(|| stop.id.clone());
        let station_idx = *station_lookup.entry(key.clone()).or_insert_with(|| {
            let idx = station_keys.len() as u32;
            station_keys.push(key);
            idx
        });
        stop_station_idx[stop.index as usize] = station_idx;
    }

    let mut station_to_platforms: Vec<Vec<u32>> = vec![Vec::new(); station_keys.len()];
    for stop in stops {
        station_to_platforms[stop_station_idx[stop.index as usize] as usize].push(stop.index);
    }

    let stations = station_keys
        .into_iter()
        .enumerate()
        .map(|(idx, id)| {
            let platforms = &station_to_platforms[idx];
            let name = station_display_name(&id, platforms, stops, stop_lookup);
            Station {
                index: idx as u32,
                id,
                name,
            }
        })
        .collect();

    (stations, station_lookup, station_to_platforms, stop_station_idx)
}

fn station_display_name(
    station_id: &str,
    platforms: &[u32],
    stops: &[Stop],
    stop_lookup: &HashMap<Arc<str>, u32>,
) -> Arc<str> {
    if let Some(&idx) = stop_lookup.get(station_id) {
        let stop = &stops[idx as usize];
        if stop.location_type == 1 {
            return stop.name.clone();
        }
    }

    let mut counts: HashMap<&str, u32> = HashMap::new();
    for &idx in platforms {
        *counts.entry(stops[idx as usize].name.as_ref()).or_default() += 1;
    }
    if let Some((name, _)) = counts
        .into_iter()
        .max_by(|(name_a, count_a), (name_b, count_b)| count_a.cmp(count_b).then(name_b.cmp(name_a)))
    {
        return Arc::from(name);
    }
    Arc::from(station_id)
}

fn attach_station_idx(mut stops: Vec<Stop>, stop_station_idx: &[u32]) -> Vec<Stop> {
    for stop in stops.iter_mut() {
        stop.station_idx = stop_station_idx[stop.index as usize];
    }
    stops
}

fn load_routes(gtfs: &mut Gtfs) -> Result<(Vec<Route>, HashMap<Arc<str>, u32>), gtfs::Error> {
    debug!("loading routes...");
    let now = Instant::now();
    let mut routes = Vec::new();
    let mut lookup = HashMap::new();
    gtfs.stream_routes(|(i, row)| {
        let id: Arc<str> = row.route_id.into();
        lookup.insert(id.clone(), i as u32);
        routes.push(Route {
            index: i as u32,
            id,
            short_name: row.route_short_name.map(Arc::from),
            long_name: row.route_long_name.map(Arc::from),
            route_type: row.route_type,
        });
    })?;
    debug!("loaded {} routes in {:?}", routes.len(), now.elapsed());
    Ok((routes, lookup))
}

fn load_trips(
    gtfs: &mut Gtfs,
    route_lookup: &HashMap<Arc<str>, u32>,
) -> Result<(Vec<Trip>, HashMap<Arc<str>, u32>), gtfs::Error> {
    debug!("loading trips...");
    let now = Instant::now();
    let mut trips = Vec::new();
    let mut lookup = HashMap::new();
    gtfs.stream_trips(|(_, row)| {
        let Some(&route_idx) = route_lookup.get(row.route_id.as_str()) else {
            return;
        };
        let index = trips.len() as u32;
        let id: Arc<str> = row.trip_id.into();
        lookup.insert(id.clone(), index);
        trips.push(Trip {
            index,
            id,
            route_idx,
            headsign: row.trip_headsign.map(Arc::from),
        });
    })?;
    debug!("loaded {} trips in {:?}", trips.len(), now.elapsed());
    Ok((trips, lookup))
}

#[allow(clippy::type_complexity)]
fn load_stop_times(
    gtfs: &mut Gtfs,
    stop_lookup: &HashMap<Arc<str>, u32>,
    trip_lookup: &HashMap<Arc<str>, u32>,
    trip_count: usize,
    stop_count: usize,
) -> Result<(Vec<StopTime>, Vec<StopTimeSlice>, Vec<Vec<u32>>), gtfs::Error> {
    debug!("loading stop times...");
    let now = Instant::now();

    let mut by_trip: Vec<Vec<StopTime>> = vec![Vec::new(); trip_count];
    gtfs.stream_stop_times(|(_, row)| {
        let (Some(&trip_idx), Some(&stop_idx)) = (
            trip_lookup.get(row.trip_id.as_str()),
            stop_lookup.get(row.stop_id.as_str()),
        ) else {
            return;
        };
        // Missing/unparseable departure rows are discarded (§3 Trip
        // invariant); missing arrival is kept, RIDE expansion skips it.
        let Some(departure_sec) = row
            .departure_time
            .as_deref()
            .and_then(Time::from_hms)
            .map(|t| t.as_seconds())
        else {
            return;
        };
        let arrival_sec = row
            .arrival_time
            .as_deref()
            .and_then(Time::from_hms)
            .map(|t| t.as_seconds());

        by_trip[trip_idx as usize].push(StopTime {
            trip_idx,
            stop_idx,
            sequence: row.stop_sequence,
            arrival_sec,
            departure_sec,
        });
    })?;

    // Every trip's rows sort independently of every other trip's; the
    // subsequent flatten into one contiguous array is inherently sequential
    // (each trip's slice offset depends on the one before it), so only the
    // sort itself is parallelized, matching the teacher's per-trip
    // `par_sort_by_key` ahead of its own sequential slice assignment.
    by_trip.par_iter_mut().for_each(|rows| rows.sort_by_key(|r| r.sequence));

    let mut stop_times = Vec::new();
    let mut trip_to_stop_slice = vec![StopTimeSlice::default(); trip_count];
    let mut rows_at_stop: Vec<Vec<u32>> = vec![Vec::new(); stop_count];

    for (trip_idx, rows) in by_trip.into_iter().enumerate() {
        let start_idx = stop_times.len() as u32;
        for row in rows {
            let global_idx = stop_times.len() as u32;
            rows_at_stop[row.stop_idx as usize].push(global_idx);
            stop_times.push(row);
        }
        trip_to_stop_slice[trip_idx] = StopTimeSlice {
            start_idx,
            count: stop_times.len() as u32 - start_idx,
        };
    }

    // Each stop's rows sort independently of every other stop's, the same
    // embarrassingly-parallel shape the teacher's ingestion exploits for its
    // per-trip stop-time sort.
    rows_at_stop
        .par_iter_mut()
        .for_each(|rows| rows.sort_by_key(|&idx| stop_times[idx as usize].departure_sec));

    debug!(
        "loaded {} stop times in {:?}",
        stop_times.len(),
        now.elapsed()
    );
    Ok((stop_times, trip_to_stop_slice, rows_at_stop))
}

const WALK_FLOOR_SEC: u32 = 30;

/// Pathways then transfers, in that order — matching §4.1 build step 8 so
/// that when both name the same (from,to) pair the pathway wins (first
/// insertion keeps `providedPairs` membership but doesn't need to dedupe
/// the walk-edge list itself; both legitimately coexist as alternatives).
fn load_walks(
    gtfs: &mut Gtfs,
    stop_lookup: &HashMap<Arc<str>, u32>,
    stop_count: usize,
) -> Result<(Vec<Vec<WalkEdge>>, HashSet<(u32, u32)>), gtfs::Error> {
    debug!("loading walk edges...");
    let now = Instant::now();
    let mut edges: Vec<Vec<WalkEdge>> = vec![Vec::new(); stop_count];
    let mut provided_pairs = HashSet::new();

    gtfs.stream_pathways(|(_, row)| {
        let (Some(&from), Some(&to)) = (
            stop_lookup.get(row.from_stop_id.as_str()),
            stop_lookup.get(row.to_stop_id.as_str()),
        ) else {
            return;
        };
        provided_pairs.insert((from, to));
        edges[from as usize].push(WalkEdge {
            to_stop_idx: to,
            seconds: row.traversal_time.max(WALK_FLOOR_SEC),
            source: WalkSource::Pathway,
        });
    })?;

    gtfs.stream_transfers(|(_, row)| {
        let (Some(&from), Some(&to)) = (
            stop_lookup.get(row.from_stop_id.as_str()),
            stop_lookup.get(row.to_stop_id.as_str()),
        ) else {
            return;
        };
        provided_pairs.insert((from, to));
        edges[from as usize].push(WalkEdge {
            to_stop_idx: to,
            seconds: row.min_transfer_time.unwrap_or(0).max(WALK_FLOOR_SEC),
            source: WalkSource::Transfer,
        });
    })?;

    debug!("loaded walk edges in {:?}", now.elapsed());
    Ok((edges, provided_pairs))
}

fn build_station_search_list(
    stations: &[Station],
    station_to_platforms: &[Vec<u32>],
    rows_at_stop: &[Vec<u32>],
) -> Vec<StationSearchEntry> {
    let mut by_lower: HashMap<String, StationSearchEntry> = HashMap::new();
    for station in stations {
        let popularity: u32 = station_to_platforms[station.index as usize]
            .iter()
            .map(|&stop_idx| rows_at_stop[stop_idx as usize].len() as u32)
            .sum();
        let lower_name = station.name.to_lowercase();
        let entry = StationSearchEntry {
            station_idx: station.index,
            name: station.name.clone(),
            lower_name: lower_name.clone().into(),
            popularity,
        };
        by_lower
            .entry(lower_name)
            .and_modify(|existing| {
                if entry.popularity > existing.popularity {
                    *existing = entry.clone();
                }
            })
            .or_insert(entry);
    }
    let mut list: Vec<_> = by_lower.into_values().collect();
    list.sort_by(|a, b| b.popularity.cmp(&a.popularity).then(a.name.as_ref().cmp(b.name.as_ref())));
    list
}
