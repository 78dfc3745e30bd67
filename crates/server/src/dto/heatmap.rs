use confluence::{HeatmapResponse, Schedule, meet::driver::Termination, meet::result::HeatmapRow};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HeatmapRowDto {
    pub stop_id: String,
    pub lat: f64,
    pub lon: f64,
    pub total_elapsed: u32,
    pub max_elapsed: u32,
    pub per_participant_elapsed: Vec<u32>,
}

impl HeatmapRowDto {
    fn from_domain(schedule: &Schedule, row: &HeatmapRow) -> Self {
        Self {
            stop_id: schedule.stop(row.stop_idx).id.to_string(),
            lat: row.coordinate.latitude,
            lon: row.coordinate.longitude,
            total_elapsed: row.total_elapsed,
            max_elapsed: row.max_elapsed,
            per_participant_elapsed: row.per_participant_elapsed.clone(),
        }
    }
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
pub struct HeatmapResponseDto {
    pub results: Vec<HeatmapRowDto>,
    pub iterations: u64,
    pub total_stops_reached: usize,
    pub termination_code: String,
}

impl HeatmapResponseDto {
    pub fn from_domain(schedule: &Schedule, response: HeatmapResponse) -> Self {
        Self {
            results: response
                .results
                .iter()
                .map(|row| HeatmapRowDto::from_domain(schedule, row))
                .collect(),
            iterations: response.iterations,
            total_stops_reached: response.total_stops_reached,
            termination_code: termination_code(response.termination),
        }
    }
}
