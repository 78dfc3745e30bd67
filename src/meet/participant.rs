use super::{Origin, Step, StepKind, WalkStepSource, heap_key};
use crate::{
    error::Error,
    limits::{MAX_INITIAL_WALK_M, MAX_WALK_RADIUS_M, MAX_WALK_TIME_SEC, MIN_TRAVEL_SEC},
    queue::PriorityQueue,
    schedule::{Schedule, entities::WalkSource, grid},
    shared::{Coordinate, Time},
};
use std::collections::HashMap;

/// Per-participant search state (C5). Owned exclusively by its query and
/// discarded afterward; nothing here is shared across participants.
pub struct Participant {
    pub index: usize,
    pub label: char,
    pub origin: Origin,
    pub t0: Time,
    pub heap: PriorityQueue<super::HeapKey, Step>,
    /// Minimum elapsed ever relaxed for a stop.
    pub best_elapsed: HashMap<u32, u32>,
    /// First-settled `(arrival_abs, elapsed)` per stop.
    pub reached_first: HashMap<u32, (u32, u32)>,
    /// The step that reached each stop, for path reconstruction.
    pub parent: HashMap<u32, Step>,
    midpoint: Coordinate,
}

impl Participant {
    pub fn new(index: usize, label: char, origin: Origin, t0: Time, midpoint: Coordinate) -> Self {
        Self {
            index,
            label,
            origin,
            t0,
            heap: PriorityQueue::new(),
            best_elapsed: HashMap::new(),
            reached_first: HashMap::new(),
            parent: HashMap::new(),
            midpoint,
        }
    }

    fn dist_to_midpoint(&self, schedule: &Schedule, stop_idx: u32) -> f64 {
        schedule
            .stop(stop_idx)
            .coordinate
            .haversine_distance(&self.midpoint)
            .as_meters()
    }

    fn push(&mut self, schedule: &Schedule, elapsed: u32, arrival_abs: u32, step: Step) {
        let key = heap_key(
            elapsed,
            arrival_abs,
            self.dist_to_midpoint(schedule, step.to_stop),
            step.to_stop,
        );
        self.heap.push(key, step);
    }

    /// C5 "station seeding" / "address seeding": seeds the participant's
    /// heap with its origin entry/entries. The three edge generators are
    /// not invoked here — they run uniformly whenever the driver pops any
    /// entry (including these seeds), so there is no special case for the
    /// origin in the main loop (§9).
    pub fn prime(&mut self, schedule: &Schedule) -> Result<(), Error> {
        match self.origin {
            Origin::Stop(stop_idx) => {
                let t0 = self.t0.as_seconds();
                let step = Step {
                    owner: self.index,
                    from_stop: None,
                    to_stop: stop_idx,
                    depart_sec: t0,
                    arrive_sec: t0,
                    kind: StepKind::Start,
                };
                self.push(schedule, 0, t0, step);
                Ok(())
            }
            Origin::Coordinate(origin) => {
                let t0 = self.t0.as_seconds();
                let nearby = grid::nearby_stops(
                    schedule.grid(),
                    &schedule.stops,
                    origin,
                    MAX_INITIAL_WALK_M,
                    None,
                );
                if nearby.is_empty() {
                    return Err(Error::NoStationsNearAddress);
                }
                for (stop_idx, distance_m) in nearby {
                    let walk_sec = ((distance_m / crate::limits::WALK_SPEED_MPS).ceil() as u32)
                        .max(MIN_TRAVEL_SEC);
                    let arrive = t0 + walk_sec;
                    let step = Step {
                        owner: self.index,
                        from_stop: None,
                        to_stop: stop_idx,
                        depart_sec: t0,
                        arrive_sec: arrive,
                        kind: StepKind::Walk {
                            walk_sec,
                            source: WalkStepSource::Address,
                            distance_m: Some(distance_m),
                        },
                    };
                    self.push(schedule, walk_sec, arrive, step);
                }
                Ok(())
            }
        }
    }

    /// Runs all three edge generators of §4.5 from `(cur_stop, cur_time,
    /// elapsed)`, pushing every emitted step into this participant's heap.
    pub fn expand(&mut self, schedule: &Schedule, cur_stop: u32, cur_time: u32, elapsed: u32) {
        self.expand_pathway_transfer_walks(schedule, cur_stop, cur_time, elapsed);
        self.expand_geo_walks(schedule, cur_stop, cur_time, elapsed);
        self.expand_rides(schedule, cur_stop, cur_time, elapsed);
    }

    fn expand_pathway_transfer_walks(
        &mut self,
        schedule: &Schedule,
        cur_stop: u32,
        cur_time: u32,
        elapsed: u32,
    ) {
        for edge in schedule.walk_edges(cur_stop) {
            let walk_sec = edge.seconds.max(MIN_TRAVEL_SEC);
            let arrive = cur_time + walk_sec;
            let source = match edge.source {
                WalkSource::Pathway => WalkStepSource::Pathways,
                WalkSource::Transfer => WalkStepSource::Transfers,
            };
            let step = Step {
                owner: self.index,
                from_stop: Some(cur_stop),
                to_stop: edge.to_stop_idx,
                depart_sec: cur_time,
                arrive_sec: arrive,
                kind: StepKind::Walk {
                    walk_sec,
                    source,
                    distance_m: None,
                },
            };
            self.push(schedule, elapsed + walk_sec, arrive, step);
        }
    }

    fn expand_geo_walks(&mut self, schedule: &Schedule, cur_stop: u32, cur_time: u32, elapsed: u32) {
        let origin = schedule.stop(cur_stop).coordinate;
        let candidates = grid::nearby_stops(
            schedule.grid(),
            &schedule.stops,
            origin,
            MAX_WALK_RADIUS_M,
            Some(cur_stop),
        );
        for (candidate, distance_m) in candidates {
            if schedule.is_provided_pair(cur_stop, candidate) {
                continue;
            }
            let ttime = ((distance_m / crate::limits::WALK_SPEED_MPS).ceil() as u32).max(MIN_TRAVEL_SEC);
            if ttime > MAX_WALK_TIME_SEC {
                continue;
            }
            let arrive = cur_time + ttime;
            let step = Step {
                owner: self.index,
                from_stop: Some(cur_stop),
                to_stop: candidate,
                depart_sec: cur_time,
                arrive_sec: arrive,
                kind: StepKind::Walk {
                    walk_sec: ttime,
                    source: WalkStepSource::Geo,
                    distance_m: Some(distance_m.round()),
                },
            };
            self.push(schedule, elapsed + ttime, arrive, step);
        }
    }

    fn expand_rides(&mut self, schedule: &Schedule, cur_stop: u32, cur_time: u32, elapsed: u32) {
        for row in schedule.rows_at_stop(cur_stop) {
            if row.departure_sec < cur_time {
                continue;
            }
            let wait = row.departure_sec - cur_time;
            let trip = schedule.trip(row.trip_idx);
            let route = schedule.route(trip.route_idx);
            for downstream in schedule.trip_stop_times(row.trip_idx) {
                if downstream.sequence <= row.sequence {
                    continue;
                }
                let Some(arrive_sec) = downstream.arrival_sec else {
                    continue;
                };
                let ride_sec = arrive_sec.saturating_sub(row.departure_sec);
                let step = Step {
                    owner: self.index,
                    from_stop: Some(cur_stop),
                    to_stop: downstream.stop_idx,
                    depart_sec: row.departure_sec,
                    arrive_sec,
                    kind: StepKind::Ride {
                        trip_idx: row.trip_idx,
                        route_idx: trip.route_idx,
                        headsign: trip.headsign.clone().or_else(|| route.short_name.clone()),
                        wait_sec: wait,
                        ride_sec,
                    },
                };
                self.push(schedule, elapsed + wait + ride_sec, arrive_sec, step);
            }
        }
    }
}
