use confluence::{
    MeetingOutcome, MeetingResponse, Schedule,
    meet::{StepKind, driver::Termination, result::ParticipantJourney},
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepDto {
    Start {
        to_stop_id: String,
        depart_sec: u32,
        arrive_sec: u32,
    },
    Walk {
        from_stop_id: Option<String>,
        to_stop_id: String,
        depart_sec: u32,
        arrive_sec: u32,
        walk_sec: u32,
        source: String,
        distance_m: Option<f64>,
    },
    Ride {
        from_stop_id: Option<String>,
        to_stop_id: String,
        depart_sec: u32,
        arrive_sec: u32,
        route_id: String,
        headsign: Option<String>,
        wait_sec: u32,
        ride_sec: u32,
    },
}

impl StepDto {
    fn from_domain(schedule: &Schedule, step: &confluence::meet::Step) -> Self {
        let to_stop_id = schedule.stop(step.to_stop).id.to_string();
        let from_stop_id = step.from_stop.map(|idx| schedule.stop(idx).id.to_string());
        match &step.kind {
            StepKind::Start => StepDto::Start {
                to_stop_id,
                depart_sec: step.depart_sec,
                arrive_sec: step.arrive_sec,
            },
            StepKind::Walk {
                walk_sec,
                source,
                distance_m,
            } => StepDto::Walk {
                from_stop_id,
                to_stop_id,
                depart_sec: step.depart_sec,
                arrive_sec: step.arrive_sec,
                walk_sec: *walk_sec,
                source: format!("{source:?}").to_lowercase(),
                distance_m: *distance_m,
            },
            StepKind::Ride {
                route_idx,
                headsign,
                wait_sec,
                ride_sec,
                ..
            } => StepDto::Ride {
                from_stop_id,
                to_stop_id,
                depart_sec: step.depart_sec,
                arrive_sec: step.arrive_sec,
                route_id: schedule.route(*route_idx).id.to_string(),
                headsign: headsign.as_ref().map(|s| s.to_string()),
                wait_sec: *wait_sec,
                ride_sec: *ride_sec,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantJourneyDto {
    pub label: char,
    pub arrive_sec: u32,
    pub elapsed_sec: u32,
    pub steps: Vec<StepDto>,
}

impl ParticipantJourneyDto {
    fn from_domain(schedule: &Schedule, journey: &ParticipantJourney) -> Self {
        Self {
            label: journey.label,
            arrive_sec: journey.arrive_sec,
            elapsed_sec: journey.elapsed_sec,
            steps: journey.steps.iter().map(|s| StepDto::from_domain(schedule, s)).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MeetingSummaryDto {
    pub stop_id: String,
    pub meet_time_sec: u32,
    pub fairness_gap_sec: u32,
    pub participants: Vec<ParticipantJourneyDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MeetingOutcomeDto {
    Ok { stop_id: String },
    Cap { participant_label: char },
    None,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsDto {
    pub iterations: u64,
    pub total_visited_nodes: u64,
    pub max_elapsed_sec: u32,
    pub termination_code: String,
    pub queue_sizes: Vec<usize>,
}

fn termination_code(termination: Termination) -> String {
    match termination {
        Termination::Ok(_) => "OK".to_string(),
        Termination::Cap(_) => "TRIP_CAP".to_string(),
        Termination::EmptyQueue => "EMPTY_QUEUE".to_string(),
        Termination::IterationLimit => "ITERATION_LIMIT".to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MeetingResponseDto {
    pub meeting: MeetingOutcomeDto,
    pub stats: StatsDto,
    pub summary: Option<MeetingSummaryDto>,
}

impl MeetingResponseDto {
    pub fn from_domain(schedule: &Schedule, response: MeetingResponse) -> Self {
        let meeting = match response.meeting {
            MeetingOutcome::Ok { stop_idx } => MeetingOutcomeDto::Ok {
                stop_id: schedule.stop(stop_idx).id.to_string(),
            },
            MeetingOutcome::Cap { participant_label } => MeetingOutcomeDto::Cap { participant_label },
            MeetingOutcome::None => MeetingOutcomeDto::None,
        };
        let stats = StatsDto {
            iterations: response.stats.iterations,
            total_visited_nodes: response.stats.total_visited_nodes,
            max_elapsed_sec: response.stats.max_elapsed_sec,
            termination_code: termination_code(response.stats.termination),
            queue_sizes: response.stats.queue_sizes,
        };
        let summary = response.summary.map(|summary| MeetingSummaryDto {
            stop_id: schedule.stop(summary.stop_idx).id.to_string(),
            meet_time_sec: summary.meet_time_sec,
            fairness_gap_sec: summary.fairness_gap_sec,
            participants: summary
                .participants
                .iter()
                .map(|j| ParticipantJourneyDto::from_domain(schedule, j))
                .collect(),
        });
        Self { meeting, stats, summary }
    }
}
