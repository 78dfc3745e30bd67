mod api;
mod dto;
mod state;

use crate::state::AppState;
use axum::routing::{get, post};
use confluence::{Schedule, gtfs::Gtfs};
use std::{env, path::Path, process, sync::Arc, time::Instant};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

const PORT: u32 = 3000;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    let start_logo = include_str!("../start_logo.txt");
    println!("{}", start_logo);

    let gtfs_data_path = match env::var("GTFS_DATA_PATH") {
        Ok(path_str) => Path::new(&path_str).to_owned(),
        Err(err) => {
            error!("Failed loading GTFS_DATA_PATH: {}", err);
            process::exit(1);
        }
    };
    let app_state = AppState {
        gtfs_data_path,
        schedule: RwLock::new(None),
    };

    if app_state.gtfs_data_path.exists() {
        info!("Loading data...");
        let now = Instant::now();
        let mut gtfs = Gtfs::new().from_zip(&app_state.gtfs_data_path).unwrap();
        let schedule = Schedule::build(&mut gtfs).unwrap();
        let _ = app_state.schedule.write().await.replace(schedule);
        info!("Loading data took {:?}", now.elapsed());
    } else {
        warn!("No GTFS data found.");
    }

    info!("Starting server...");

    let app = axum::Router::new()
        .route("/meet", post(api::meet))
        .route("/heatmap", post(api::heatmap))
        .route("/gtfs/load", post(api::load))
        .route("/gtfs/age", get(api::age))
        .with_state(Arc::new(app_state));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", PORT))
        .await
        .unwrap();
    info!("Listening to port {PORT}");
    axum::serve(listener, app).await.unwrap();
}
