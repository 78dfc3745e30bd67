pub mod geo;
pub mod time;

pub use geo::{Coordinate, Distance, ParseCoordinateError};
pub use time::{Duration, Time};
