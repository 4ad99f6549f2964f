//! Core mapping algorithms

pub mod geodesy;
pub mod idw;
pub mod proximity;

pub use geodesy::haversine_distance_m;
pub use idw::{CoordinateTransformer, TransformError};
