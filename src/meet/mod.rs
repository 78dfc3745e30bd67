pub mod driver;
pub mod participant;
pub mod result;

use crate::shared::Coordinate;
use std::sync::Arc;

/// A participant's origin: either a resolved station platform, or a bare
/// geographic point that must be address-seeded onto nearby stops (C5).
#[derive(Debug, Clone, Copy)]
pub enum Origin {
    Stop(u32),
    Coordinate(Coordinate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStepSource {
    Pathways,
    Transfers,
    Geo,
    Address,
}

/// The tagged step-info record of §3. Common fields live on [`Step`]
/// itself; variant-specific fields live in [`StepKind`].
#[derive(Debug, Clone)]
pub struct Step {
    pub owner: usize,
    pub from_stop: Option<u32>,
    pub to_stop: u32,
    pub depart_sec: u32,
    pub arrive_sec: u32,
    pub kind: StepKind,
}

#[derive(Debug, Clone)]
pub enum StepKind {
    Start,
    Walk {
        walk_sec: u32,
        source: WalkStepSource,
        distance_m: Option<f64>,
    },
    Ride {
        trip_idx: u32,
        route_idx: u32,
        headsign: Option<Arc<str>>,
        wait_sec: u32,
        ride_sec: u32,
    },
}

/// `(elapsed_sec, arrival_abs_sec, dist_to_midpoint_m, to_stop)` — the
/// lexicographic heap key of §4.3. `dist_to_midpoint_m` is rounded to whole
/// meters so the tuple has a total order without pulling in a float
/// newtype just for this one tiebreaker.
pub type HeapKey = (u32, u32, u32, u32);

pub fn heap_key(elapsed: u32, arrival_abs: u32, dist_to_midpoint_m: f64, to_stop: u32) -> HeapKey {
    (elapsed, arrival_abs, dist_to_midpoint_m.round() as u32, to_stop)
}
