//! Multi-source time-dependent meeting-point search over a static GTFS
//! schedule: given 2-5 participants with their own origins and a shared
//! departure instant, find the first stop all of them can reach, or sweep
//! every reachable stop in heatmap mode.

pub mod error;
pub mod gtfs;
pub mod limits;
pub mod meet;
pub mod query;
pub mod queue;
pub mod schedule;
pub mod shared;

pub use error::Error;
pub use limits::SearchLimits;
pub use query::{
    HeatmapRequest, HeatmapResponse, MeetingOutcome, MeetingRequest, MeetingResponse, ParticipantInput,
    ParticipantRequest,
};
pub use schedule::Schedule;
