use super::{Origin, Step, StepKind, driver::HeatmapEntry, participant::Participant};
use crate::schedule::Schedule;
use crate::shared::Coordinate;
use std::collections::HashMap;

/// One participant's reconstructed journey to the meeting stop, with the
/// synthetic origin step prepended for station-seeded participants (§4.8).
#[derive(Debug, Clone)]
pub struct ParticipantJourney {
    pub label: char,
    pub steps: Vec<Step>,
    pub arrive_sec: u32,
    pub elapsed_sec: u32,
}

#[derive(Debug, Clone)]
pub struct MeetingSummary {
    pub stop_idx: u32,
    pub meet_time_sec: u32,
    pub fairness_gap_sec: u32,
    pub participants: Vec<ParticipantJourney>,
}

/// Walks `parent[p]` back from `stop_idx` to the origin, prepending each
/// step as it goes. A coordinate-origin participant's chain bottoms out at
/// an ADDRESS walk step with `from_stop=None`; a station-origin
/// participant's chain bottoms out with no parent entry at all, since the
/// driver never records a parent for a `Start` step — the synthetic START
/// step representing that origin is added by [`reconstruct_journey`], not
/// found on the chain.
fn reconstruct_path(participant: &Participant, stop_idx: u32) -> Vec<Step> {
    let mut steps = Vec::new();
    let mut cur = stop_idx;
    while let Some(step) = participant.parent.get(&cur) {
        let from = step.from_stop;
        steps.push(step.clone());
        match from {
            Some(prev) => cur = prev,
            None => break,
        }
    }
    steps.reverse();
    steps
}

pub fn reconstruct_journey(participant: &Participant, stop_idx: u32) -> Vec<Step> {
    let mut steps = reconstruct_path(participant, stop_idx);
    if let Origin::Stop(origin_stop) = participant.origin {
        let t0 = participant.t0.as_seconds();
        steps.insert(
            0,
            Step {
                owner: participant.index,
                from_stop: None,
                to_stop: origin_stop,
                depart_sec: t0,
                arrive_sec: t0,
                kind: StepKind::Start,
            },
        );
    }
    steps
}

/// `meetTime = max_q reachedFirst[q][stop].arrive_sec`; fairness `Δ = max_q
/// elapsed − min_q elapsed` (§4.8).
pub fn assemble_meeting(participants: &[Participant], stop_idx: u32) -> MeetingSummary {
    let journeys: Vec<ParticipantJourney> = participants
        .iter()
        .map(|p| {
            let (arrive_sec, elapsed_sec) = p
                .reached_first
                .get(&stop_idx)
                .copied()
                .expect("meeting test guarantees every participant reached stop_idx");
            ParticipantJourney {
                label: p.label,
                steps: reconstruct_journey(p, stop_idx),
                arrive_sec,
                elapsed_sec,
            }
        })
        .collect();

    let meet_time_sec = journeys.iter().map(|j| j.arrive_sec).max().unwrap_or(0);
    let max_elapsed = journeys.iter().map(|j| j.elapsed_sec).max().unwrap_or(0);
    let min_elapsed = journeys.iter().map(|j| j.elapsed_sec).min().unwrap_or(0);

    MeetingSummary {
        stop_idx,
        meet_time_sec,
        fairness_gap_sec: max_elapsed - min_elapsed,
        participants: journeys,
    }
}

#[derive(Debug, Clone)]
pub struct HeatmapRow {
    pub stop_idx: u32,
    pub coordinate: Coordinate,
    pub total_elapsed: u32,
    pub max_elapsed: u32,
    pub per_participant_elapsed: Vec<u32>,
}

/// Attaches coordinates to every recorded heatmap stop, sorted by stop
/// index for a deterministic base ordering; ranking for display is left to
/// the caller, as §4.8 notes.
pub fn assemble_heatmap(schedule: &Schedule, results: &HashMap<u32, HeatmapEntry>) -> Vec<HeatmapRow> {
    let mut rows: Vec<HeatmapRow> = results
        .iter()
        .map(|(&stop_idx, entry)| HeatmapRow {
            stop_idx,
            coordinate: schedule.stop(stop_idx).coordinate,
            total_elapsed: entry.total_elapsed,
            max_elapsed: entry.max_elapsed,
            per_participant_elapsed: entry.per_participant_elapsed.clone(),
        })
        .collect();
    rows.sort_by_key(|r| r.stop_idx);
    rows
}
