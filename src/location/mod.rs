//! Platform location abstraction
//!
//! The tracker depends only on this trait: a one-shot reading request and a
//! continuous watch with an unsubscribe handle. The mock implementation
//! drives tests and the demo binary.

pub mod error;
pub mod mock;

pub use error::{LocationError, LocationResult};
pub use mock::MockLocationSource;

use crate::core::RawReading;
use serde::{Deserialize, Serialize};

/// Options passed through to the platform for a location request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRequestOptions {
    /// Prefer the high-accuracy positioning mode
    pub high_accuracy: bool,
    /// Maximum time to wait for a reading (milliseconds)
    pub timeout_ms: u32,
    /// Maximum acceptable age of a cached platform reading (milliseconds)
    pub max_age_ms: u32,
}

impl LocationRequestOptions {
    /// Options for one-shot requests: patient timeout, cached readings allowed
    pub fn one_shot() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: 15_000,
            max_age_ms: 60_000,
        }
    }

    /// Options for continuous watches: shorter timeout, nearly fresh readings
    pub fn watch() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: 8_000,
            max_age_ms: 3_000,
        }
    }
}

/// Handle identifying an active continuous watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u32);

impl WatchId {
    pub fn new(id: u32) -> Self {
        WatchId(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Source of geographic readings, one-shot or continuous
pub trait LocationSource: Send {
    /// Whether the platform exposes a location capability at all
    fn is_available(&self) -> bool;

    /// Request a single reading, blocking up to the configured timeout
    fn current_reading(&mut self, options: &LocationRequestOptions) -> LocationResult<RawReading>;

    /// Subscribe to continuous readings; returns the unsubscribe handle
    fn watch(&mut self, options: &LocationRequestOptions) -> LocationResult<WatchId>;

    /// Drain the next pending reading or error from an active watch
    fn poll(&mut self, watch: WatchId) -> Option<LocationResult<RawReading>>;

    /// Cancel a continuous watch; unknown handles are ignored
    fn clear_watch(&mut self, watch: WatchId);
}
