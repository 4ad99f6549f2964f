//! Core data types for the GPS mapper

use serde::{Deserialize, Serialize};

/// Geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub lat: f64,
    pub lng: f64,
}

impl GeoCoordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Raw reading delivered by the platform location source.
/// Ephemeral: consumed immediately by the filter or queued in a pending batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawReading {
    pub lat: f64,
    pub lng: f64,
    /// Reported accuracy radius (meters), if the platform provides one
    pub accuracy: Option<f64>,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

impl RawReading {
    pub fn new(lat: f64, lng: f64, timestamp_ms: u64) -> Self {
        Self {
            lat,
            lng,
            accuracy: None,
            timestamp_ms,
        }
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }
}

/// Exponentially blended position produced by the filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedPosition {
    pub lat: f64,
    pub lng: f64,
    pub accuracy: Option<f64>,
    pub timestamp_ms: u64,
}

/// Position in the local map coordinate space (viewport-height units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalPosition {
    pub x: f64,
    pub y: f64,
}

/// The last fully-processed position: geographic plus mapped local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentPosition {
    pub lat: f64,
    pub lng: f64,
    pub x: f64,
    pub y: f64,
    pub accuracy: Option<f64>,
}

/// Calibration anchor pairing a geographic coordinate with a local one.
/// Immutable once added to the store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub lat: f64,
    pub lng: f64,
    pub x: f64,
    pub y: f64,
}

/// Named point of interest on the map with a proximity radius
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    /// Distance within which the marker counts as "near" (meters)
    pub radius_m: f64,
}
