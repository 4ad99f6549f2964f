//! Reading processing: smoothing filter and transform result cache

pub mod cache;
pub mod filter;

pub use cache::TransformCache;
pub use filter::PositionFilter;
