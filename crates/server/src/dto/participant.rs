use confluence::{ParticipantInput, ParticipantRequest};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParticipantInputDto {
    Station {
        query: String,
        #[serde(default)]
        start_stop_id: Option<String>,
    },
    Address {
        lat: f64,
        lon: f64,
    },
}

impl From<ParticipantInputDto> for ParticipantInput {
    fn from(value: ParticipantInputDto) -> Self {
        match value {
            ParticipantInputDto::Station { query, start_stop_id } => ParticipantInput::Station { query, start_stop_id },
            ParticipantInputDto::Address { lat, lon } => ParticipantInput::Address((lat, lon).into()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantRequestDto {
    pub label: char,
    pub input: ParticipantInputDto,
}

impl From<ParticipantRequestDto> for ParticipantRequest {
    fn from(value: ParticipantRequestDto) -> Self {
        ParticipantRequest {
            label: value.label,
            input: value.input.into(),
        }
    }
}
