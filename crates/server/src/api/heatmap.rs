use crate::{
    dto::{HeatmapResponseDto, ParticipantRequestDto},
    state::AppState,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use confluence::{HeatmapRequest, SearchLimits, query};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct HeatmapRequestDto {
    pub participants: Vec<ParticipantRequestDto>,
    pub start_time: String,
    #[serde(default)]
    pub iteration_cap: Option<u64>,
}

pub async fn heatmap(
    State(state): State<Arc<AppState>>,
    Json(body): Json<HeatmapRequestDto>,
) -> Result<Response, StatusCode> {
    let Some(schedule) = &*state.schedule.read().await else {
        warn!("heatmap request received before a schedule was loaded");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let request = HeatmapRequest {
        participants: body.participants.into_iter().map(Into::into).collect(),
        start_time: body.start_time,
        iteration_cap: body.iteration_cap,
    };

    let response = query::run_heatmap(schedule, &request, SearchLimits::default()).map_err(|err| {
        warn!("heatmap query rejected: {err}");
        StatusCode::BAD_REQUEST
    })?;

    Ok(Json(HeatmapResponseDto::from_domain(schedule, response)).into_response())
}
