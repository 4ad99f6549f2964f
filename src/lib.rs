//! GPS mapper for rotated, hand-calibrated maps
//!
//! Transforms device GPS coordinates into the local coordinate space of a
//! stylized map image via reference-point interpolation, smooths noisy
//! readings, detects proximity to configured markers, and manages a
//! throttled continuous-tracking session with callback notifications.

pub mod algorithms;
pub mod api;
pub mod core;
pub mod location;
pub mod processing;
pub mod utils;

// Re-export commonly used types
pub use algorithms::{haversine_distance_m, CoordinateTransformer, TransformError};
pub use api::{
    CallbackHandle, EventCallback, GpsError, GpsEvent, GpsResult, GpsTracker, TestingActivation,
    TestingStatus,
};
pub use crate::core::{
    CurrentPosition, GeoCoordinate, LocalPosition, MapMarker, RawReading, ReferencePoint,
    SmoothedPosition,
};
pub use location::{
    LocationError, LocationRequestOptions, LocationResult, LocationSource, MockLocationSource,
    WatchId,
};
pub use processing::{PositionFilter, TransformCache};
pub use utils::{ConfigError, FilterConfig, MapperConfig, TrackingConfig};
