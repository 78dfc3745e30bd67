use confluence::Schedule;
use std::path::PathBuf;
use tokio::sync::RwLock;

pub struct AppState {
    pub gtfs_data_path: PathBuf,
    pub schedule: RwLock<Option<Schedule>>,
}
