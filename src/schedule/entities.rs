use crate::shared::Coordinate;
use std::sync::Arc;

/// A physical point where passengers can board or alight, or a station
/// container record (GTFS `location_type=1`).
#[derive(Debug, Clone)]
pub struct Stop {
    pub index: u32,
    pub id: Arc<str>,
    pub name: Arc<str>,
    pub coordinate: Coordinate,
    pub location_type: u8,
    /// Raw `parent_station` from the feed, before resolution to a station
    /// index. `None` means this stop is its own station.
    pub parent_station: Option<Arc<str>>,
    /// Resolved index into [`super::Schedule::stations`].
    pub station_idx: u32,
}

/// Logical grouping of platforms sharing a name; the unit a traveller
/// actually searches for and the unit the meeting search settles on.
#[derive(Debug, Clone)]
pub struct Station {
    pub index: u32,
    pub id: Arc<str>,
    pub name: Arc<str>,
}

/// A named transit line; trips belong to exactly one route.
#[derive(Debug, Clone)]
pub struct Route {
    pub index: u32,
    pub id: Arc<str>,
    pub short_name: Option<Arc<str>>,
    pub long_name: Option<Arc<str>>,
    pub route_type: Option<i32>,
}

/// One scheduled run of a route along an ordered sequence of stop-times.
#[derive(Debug, Clone)]
pub struct Trip {
    pub index: u32,
    pub id: Arc<str>,
    pub route_idx: u32,
    pub headsign: Option<Arc<str>>,
}

/// A decorated, index-based stop-time row. The global `stop_times` array is
/// laid out sorted by `(trip_idx, sequence)`, so a trip's rows are always a
/// contiguous slice described by [`StopTimeSlice`] — no indirection needed
/// to walk "the rest of this trip".
#[derive(Debug, Clone, Copy)]
pub struct StopTime {
    pub trip_idx: u32,
    pub stop_idx: u32,
    pub sequence: u32,
    /// `None` when the feed omitted it; a RIDE never boards using this
    /// field but may skip alighting here if so.
    pub arrival_sec: Option<u32>,
    pub departure_sec: u32,
}

/// Describes the contiguous range in `stop_times` belonging to one trip.
#[derive(Debug, Clone, Copy, Default)]
pub struct StopTimeSlice {
    pub start_idx: u32,
    pub count: u32,
}

/// Where an explicit walk edge originated — governs precedence against
/// synthesized geographic walks and labels emitted WALK steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkSource {
    Pathway,
    Transfer,
}

/// A directed pedestrian link between two stops, already floor-clamped to
/// `max(30, provided_seconds)`.
#[derive(Debug, Clone, Copy)]
pub struct WalkEdge {
    pub to_stop_idx: u32,
    pub seconds: u32,
    pub source: WalkSource,
}

/// A station's position in the name-ranked lookup list consulted by the
/// station resolver (C8).
#[derive(Debug, Clone)]
pub struct StationSearchEntry {
    pub station_idx: u32,
    pub name: Arc<str>,
    pub lower_name: Arc<str>,
    pub popularity: u32,
}
