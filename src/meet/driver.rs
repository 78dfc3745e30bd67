use super::{StepKind, participant::Participant};
use crate::{limits::SearchLimits, schedule::Schedule};
use std::collections::HashMap;

/// How a search driver stopped (C6 §4.6 / C7 §4.7). Caps are not errors —
/// they are diagnostic termination states, carried in [`DriverStats`]
/// rather than surfaced through `crate::error::Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Ok(u32),
    Cap(usize),
    EmptyQueue,
    IterationLimit,
}

#[derive(Debug, Clone)]
pub struct DriverStats {
    pub iterations: u64,
    pub total_visited_nodes: u64,
    pub max_elapsed_sec: u32,
    pub termination: Termination,
    pub queue_sizes: Vec<usize>,
}

/// Interleaved multi-source Dijkstra (C6). Pops the globally-smallest
/// `elapsed` entry across all participants' heaps on every iteration, so
/// progress is synchronized on a shared elapsed-time axis rather than
/// participant-by-participant.
pub fn run_meeting(schedule: &Schedule, participants: &mut [Participant], limits: &SearchLimits) -> DriverStats {
    let mut iterations: u64 = 0;
    let mut total_visited: u64 = 0;
    let mut max_elapsed: u32 = 0;
    let mut cap_exceeded: Option<usize> = None;

    let termination = loop {
        iterations += 1;
        if iterations > limits.iteration_cap {
            break Termination::IterationLimit;
        }

        let Some(pi) = select_smallest(participants) else {
            break Termination::EmptyQueue;
        };

        let (elapsed, _) = participants[pi].heap.peek().expect("selected heap is non-empty");
        let e = elapsed.0;
        if e > limits.max_trip_sec {
            participants[pi].heap.pop();
            cap_exceeded = Some(pi);
            continue;
        }

        let (key, step) = participants[pi].heap.pop().expect("selected heap is non-empty");
        let e = key.0;
        let dst = step.to_stop;
        max_elapsed = max_elapsed.max(e);

        let participant = &mut participants[pi];
        if let Some(&prev) = participant.best_elapsed.get(&dst) {
            if prev <= e {
                continue;
            }
        }
        participant.best_elapsed.insert(dst, e);
        total_visited += 1;

        if !matches!(step.kind, StepKind::Start) {
            participant.parent.insert(dst, step.clone());
        }

        let improves = participant
            .reached_first
            .get(&dst)
            .is_none_or(|&(_, old_e)| e < old_e);
        if improves {
            participant.reached_first.insert(dst, (step.arrive_sec, e));
        }

        if participants.iter().all(|q| q.reached_first.contains_key(&dst)) {
            break Termination::Ok(dst);
        }

        participants[pi].expand(schedule, dst, step.arrive_sec, e);
    };

    let termination = match termination {
        Termination::EmptyQueue => cap_exceeded.map(Termination::Cap).unwrap_or(Termination::EmptyQueue),
        other => other,
    };

    DriverStats {
        iterations,
        total_visited_nodes: total_visited,
        max_elapsed_sec: max_elapsed,
        termination,
        queue_sizes: participants.iter().map(|p| p.heap.len()).collect(),
    }
}

/// One heatmap record: `stop_idx -> (total_elapsed, max_elapsed,
/// per_participant_elapsed)` (§4.7).
#[derive(Debug, Clone)]
pub struct HeatmapEntry {
    pub total_elapsed: u32,
    pub max_elapsed: u32,
    pub per_participant_elapsed: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct HeatmapStats {
    pub iterations: u64,
    pub termination: Termination,
}

/// The visit-policy variant of [`run_meeting`] (C7 §4.7): never terminates
/// on a meeting, instead recording the best `max_elapsed` observed for
/// every stop every participant has reached, until both heaps are empty or
/// the iteration cap is hit.
pub fn run_heatmap(
    schedule: &Schedule,
    participants: &mut [Participant],
    limits: &SearchLimits,
    mut on_progress: Option<&mut dyn FnMut(f64, f64, u64, usize)>,
    mut on_stop_update: Option<&mut dyn FnMut(u32, &HeatmapEntry)>,
) -> (HashMap<u32, HeatmapEntry>, HeatmapStats) {
    let mut results: HashMap<u32, HeatmapEntry> = HashMap::new();
    let mut iterations: u64 = 0;
    let mut max_elapsed: u32 = 0;
    let mut last_reported_half_minute: u64 = 0;

    let termination = loop {
        iterations += 1;
        if iterations > limits.iteration_cap {
            break Termination::IterationLimit;
        }

        let Some(pi) = select_smallest(participants) else {
            break Termination::EmptyQueue;
        };

        let (elapsed, _) = participants[pi].heap.peek().expect("selected heap is non-empty");
        if elapsed.0 > limits.max_trip_sec {
            participants[pi].heap.pop();
            continue;
        }

        let (key, step) = participants[pi].heap.pop().expect("selected heap is non-empty");
        let e = key.0;
        let dst = step.to_stop;
        max_elapsed = max_elapsed.max(e);

        let participant = &mut participants[pi];
        if let Some(&prev) = participant.best_elapsed.get(&dst) {
            if prev <= e {
                continue;
            }
        }
        participant.best_elapsed.insert(dst, e);

        if !matches!(step.kind, StepKind::Start) {
            participant.parent.insert(dst, step.clone());
        }

        let improves = participant
            .reached_first
            .get(&dst)
            .is_none_or(|&(_, old_e)| e < old_e);
        if improves {
            participant.reached_first.insert(dst, (step.arrive_sec, e));
        }

        if participants.iter().all(|q| q.reached_first.contains_key(&dst)) {
            let per_participant: Vec<u32> = participants
                .iter()
                .map(|q| q.reached_first.get(&dst).expect("checked above").1)
                .collect();
            let candidate_max = *per_participant.iter().max().expect("non-empty participants");
            let replace = results.get(&dst).is_none_or(|existing| candidate_max < existing.max_elapsed);
            if replace {
                let entry = HeatmapEntry {
                    total_elapsed: per_participant.iter().sum(),
                    max_elapsed: candidate_max,
                    per_participant_elapsed: per_participant,
                };
                if let Some(cb) = on_stop_update.as_deref_mut() {
                    if iterations % 5000 == 0 {
                        cb(dst, &entry);
                    }
                }
                results.insert(dst, entry);
            }
        }

        participants[pi].expand(schedule, dst, step.arrive_sec, e);

        let explored_minutes = max_elapsed as f64 / 60.0;
        let half_minute_step = (explored_minutes / 0.5) as u64;
        if half_minute_step > last_reported_half_minute {
            last_reported_half_minute = half_minute_step;
            if let Some(cb) = on_progress.as_deref_mut() {
                let percent = (max_elapsed as f64 / limits.max_trip_sec as f64 * 100.0).min(100.0);
                cb(percent, explored_minutes, iterations, results.len());
            }
        }
    };

    if let Some(cb) = on_progress.as_deref_mut() {
        if !matches!(termination, Termination::IterationLimit) {
            cb(100.0, max_elapsed as f64 / 60.0, iterations, results.len());
        }
    }

    (results, HeatmapStats { iterations, termination })
}

fn select_smallest(participants: &[Participant]) -> Option<usize> {
    participants
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.heap.peek().map(|(key, _)| (i, *key)))
        .min_by_key(|&(_, key)| key)
        .map(|(i, _)| i)
}
