//! Public tracking API: controller, events, and error types

pub mod tracker;
pub mod types;

pub use tracker::GpsTracker;
pub use types::{
    CallbackHandle, EventCallback, GpsError, GpsEvent, GpsResult, TestingActivation, TestingStatus,
};
