pub mod gtfs;
pub mod heatmap;
pub mod meet;

pub use gtfs::{age, load};
pub use heatmap::heatmap;
pub use meet::meet;
