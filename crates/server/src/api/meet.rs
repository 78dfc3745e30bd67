use crate::{
    dto::{MeetingResponseDto, ParticipantRequestDto},
    state::AppState,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use confluence::{MeetingRequest, SearchLimits, query};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct MeetingRequestDto {
    pub participants: Vec<ParticipantRequestDto>,
    pub start_time: String,
}

pub async fn meet(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MeetingRequestDto>,
) -> Result<Response, StatusCode> {
    let Some(schedule) = &*state.schedule.read().await else {
        warn!("meeting request received before a schedule was loaded");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let request = MeetingRequest {
        participants: body.participants.into_iter().map(Into::into).collect(),
        start_time: body.start_time,
    };

    let response = query::run_meeting(schedule, &request, &SearchLimits::default()).map_err(|err| {
        warn!("meeting query rejected: {err}");
        StatusCode::BAD_REQUEST
    })?;

    Ok(Json(MeetingResponseDto::from_domain(schedule, response)).into_response())
}
