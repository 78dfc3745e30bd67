//! The top-level external API (§6): validates a meeting/heatmap request,
//! resolves participant origins (C8), primes and drives the search (C5/C6/
//! C7), and assembles the response shapes the contract describes.

use crate::{
    error::Error,
    limits::{MAX_PARTICIPANTS, MIN_PARTICIPANTS, SearchLimits},
    meet::{
        Origin,
        driver::{self, DriverStats, HeatmapEntry, HeatmapStats, Termination},
        participant::Participant,
        result::{self, HeatmapRow, MeetingSummary},
    },
    schedule::{Schedule, resolver},
    shared::{Coordinate, Time},
};
use std::sync::Arc;

/// A participant's requested origin: a station query (optionally pinned to
/// one of its platforms) or a bare geographic address.
#[derive(Debug, Clone)]
pub enum ParticipantInput {
    Station {
        query: String,
        start_stop_id: Option<String>,
    },
    Address(Coordinate),
}

#[derive(Debug, Clone)]
pub struct ParticipantRequest {
    pub label: char,
    pub input: ParticipantInput,
}

#[derive(Debug, Clone)]
pub struct MeetingRequest {
    pub participants: Vec<ParticipantRequest>,
    pub start_time: String,
}

#[derive(Debug, Clone)]
pub struct HeatmapRequest {
    pub participants: Vec<ParticipantRequest>,
    pub start_time: String,
    pub iteration_cap: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingOutcome {
    Ok { stop_idx: u32 },
    Cap { participant_label: char },
    None,
}

#[derive(Debug, Clone)]
pub struct Stats {
    pub iterations: u64,
    pub total_visited_nodes: u64,
    pub max_elapsed_sec: u32,
    pub termination: Termination,
    pub queue_sizes: Vec<usize>,
}

impl From<DriverStats> for Stats {
    fn from(s: DriverStats) -> Self {
        Self {
            iterations: s.iterations,
            total_visited_nodes: s.total_visited_nodes,
            max_elapsed_sec: s.max_elapsed_sec,
            termination: s.termination,
            queue_sizes: s.queue_sizes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MeetingResponse {
    pub meeting: MeetingOutcome,
    pub stats: Stats,
    /// The reconstructed per-participant journey to the meeting stop, when
    /// one was found. Not named in the bit-exact external contract of §6,
    /// but the data C7 already computes — surfaced here rather than
    /// discarded, the way the teacher's handlers return more than the
    /// bare minimum when the computation is already done.
    pub summary: Option<MeetingSummary>,
}

#[derive(Debug, Clone)]
pub struct HeatmapResponse {
    pub results: Vec<HeatmapRow>,
    pub iterations: u64,
    pub total_stops_reached: usize,
    pub termination: Termination,
}

fn validate_participant_count(len: usize) -> Result<(), Error> {
    if len < MIN_PARTICIPANTS {
        return Err(Error::TooFewParticipants(len));
    }
    if len > MAX_PARTICIPANTS {
        return Err(Error::TooManyParticipants {
            got: len,
            max: MAX_PARTICIPANTS,
        });
    }
    Ok(())
}

fn resolve_origin(schedule: &Schedule, input: &ParticipantInput, t0: Time) -> Result<Origin, Error> {
    match input {
        ParticipantInput::Address(coordinate) => Ok(Origin::Coordinate(*coordinate)),
        ParticipantInput::Station { query, start_stop_id } => {
            let station = resolver::resolve_station(schedule, query)?;
            if let Some(explicit_id) = start_stop_id {
                let stop_idx = schedule
                    .stop_by_id(explicit_id)
                    .filter(|&idx| schedule.stop(idx).station_idx == station.station_idx)
                    .ok_or_else(|| Error::StartPlatformMismatch(explicit_id.clone(), station.name.to_string()))?;
                Ok(Origin::Stop(stop_idx))
            } else {
                let stop_idx = resolver::pick_start_platform(schedule, station.station_idx, t0)
                    .ok_or_else(|| Error::NoDeparturePlatform(station.name.to_string()))?;
                Ok(Origin::Stop(stop_idx))
            }
        }
    }
}

fn origin_coordinate(schedule: &Schedule, origin: Origin) -> Coordinate {
    match origin {
        Origin::Stop(idx) => schedule.stop(idx).coordinate,
        Origin::Coordinate(c) => c,
    }
}

fn midpoint_of(coordinates: &[Coordinate]) -> Coordinate {
    let n = coordinates.len() as f64;
    let (lat_sum, lon_sum) = coordinates
        .iter()
        .fold((0.0, 0.0), |(la, lo), c| (la + c.latitude, lo + c.longitude));
    Coordinate {
        latitude: lat_sum / n,
        longitude: lon_sum / n,
    }
}

fn build_participants(
    schedule: &Schedule,
    requests: &[ParticipantRequest],
    t0: Time,
) -> Result<Vec<Participant>, Error> {
    let origins: Vec<Origin> = requests
        .iter()
        .map(|r| resolve_origin(schedule, &r.input, t0))
        .collect::<Result<_, _>>()?;

    let coordinates: Vec<Coordinate> = origins.iter().map(|&o| origin_coordinate(schedule, o)).collect();
    let midpoint = midpoint_of(&coordinates);

    let mut participants: Vec<Participant> = requests
        .iter()
        .zip(origins)
        .enumerate()
        .map(|(i, (r, origin))| Participant::new(i, r.label, origin, t0, midpoint))
        .collect();

    for participant in participants.iter_mut() {
        participant.prime(schedule)?;
    }

    Ok(participants)
}

fn parse_start_time(raw: &str) -> Result<Time, Error> {
    Time::from_hms(raw).ok_or_else(|| Error::MalformedTime(raw.to_string()))
}

pub fn run_meeting(schedule: &Schedule, request: &MeetingRequest, limits: &SearchLimits) -> Result<MeetingResponse, Error> {
    validate_participant_count(request.participants.len())?;
    let t0 = parse_start_time(&request.start_time)?;
    let mut participants = build_participants(schedule, &request.participants, t0)?;

    let stats = driver::run_meeting(schedule, &mut participants, limits);

    let (meeting, summary) = match stats.termination {
        Termination::Ok(stop_idx) => (
            MeetingOutcome::Ok { stop_idx },
            Some(result::assemble_meeting(&participants, stop_idx)),
        ),
        Termination::Cap(pi) => (
            MeetingOutcome::Cap {
                participant_label: participants[pi].label,
            },
            None,
        ),
        Termination::EmptyQueue | Termination::IterationLimit => (MeetingOutcome::None, None),
    };

    Ok(MeetingResponse {
        meeting,
        stats: stats.into(),
        summary,
    })
}

pub fn run_heatmap(schedule: &Schedule, request: &HeatmapRequest, mut limits: SearchLimits) -> Result<HeatmapResponse, Error> {
    validate_participant_count(request.participants.len())?;
    if let Some(cap) = request.iteration_cap {
        limits.iteration_cap = cap;
    }
    let t0 = parse_start_time(&request.start_time)?;
    let mut participants = build_participants(schedule, &request.participants, t0)?;

    let (entries, stats): (std::collections::HashMap<u32, HeatmapEntry>, HeatmapStats) =
        driver::run_heatmap(schedule, &mut participants, &limits, None, None);

    let results = result::assemble_heatmap(schedule, &entries);
    Ok(HeatmapResponse {
        total_stops_reached: results.len(),
        results,
        iterations: stats.iterations,
        termination: stats.termination,
    })
}

/// Resolves a station query without running a search — the building block
/// a host uses for autocomplete-adjacent lookups, per §1's note that
/// autocomplete itself is out of scope but the resolver it would call on
/// isn't.
pub fn resolve_station_name(schedule: &Schedule, query: &str) -> Result<Arc<str>, Error> {
    resolver::resolve_station(schedule, query).map(|m| m.name)
}
