use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use confluence::{Schedule, gtfs::Gtfs};
use serde::Deserialize;
use std::{fs, path::Path, sync::Arc, time::Instant};
use tracing::{error, info};

#[derive(Debug, Clone, Deserialize)]
pub struct LoadRequest {
    pub path: String,
}

/// `POST /gtfs/load`: loads a feed (zip archive or extracted directory) at
/// `path` and replaces the shared, `RwLock`-guarded schedule index.
/// Mirrors the teacher's `GTFS_DATA_PATH`-driven startup load, generalized
/// to accept any path at runtime; the network fetch the teacher's
/// `/gtfs/fetch-url` performed is out of scope here (see SPEC_FULL.md §6).
pub async fn load(State(state): State<Arc<AppState>>, Json(body): Json<LoadRequest>) -> Result<Response, StatusCode> {
    let path = Path::new(&body.path);
    let now = Instant::now();
    let mut gtfs = if path.is_dir() {
        Gtfs::new().from_directory(path)
    } else {
        Gtfs::new().from_zip(path).map_err(|err| {
            error!("failed to open feed at {}: {err}", body.path);
            StatusCode::BAD_REQUEST
        })?
    };

    let schedule = Schedule::build(&mut gtfs).map_err(|err| {
        error!("failed to build schedule from {}: {err}", body.path);
        StatusCode::UNPROCESSABLE_ENTITY
    })?;
    info!("loaded schedule from {} in {:?}", body.path, now.elapsed());

    state.schedule.write().await.replace(schedule);
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// `GET /gtfs/age`: seconds since the currently-loaded feed file was last
/// modified on disk, mirrored from the teacher's identical endpoint.
pub async fn age(State(state): State<Arc<AppState>>) -> Result<Response, StatusCode> {
    if !state.gtfs_data_path.exists() {
        return Err(StatusCode::NOT_FOUND);
    }
    let seconds = seconds_since_modified(&state.gtfs_data_path)?;
    Ok(seconds.to_string().into_response())
}

fn seconds_since_modified<P: AsRef<Path>>(path: P) -> Result<u64, StatusCode> {
    let meta_data = fs::metadata(path).map_err(|err| {
        error!("failed to read metadata: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let modified = meta_data.modified().map_err(|err| {
        error!("failed to read modified time: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let duration = modified.elapsed().map_err(|err| {
        error!("modified time is in the future: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(duration.as_secs())
}
