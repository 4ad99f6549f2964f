//! Common API types for the tracking controller

use crate::algorithms::TransformError;
use crate::core::{CurrentPosition, GeoCoordinate, MapMarker};
use crate::location::LocationError;
use std::fmt;

/// Result type for tracker operations
pub type GpsResult<T> = Result<T, GpsError>;

/// Errors surfaced by the tracking controller
#[derive(Debug, Clone, PartialEq)]
pub enum GpsError {
    /// The transformer has fewer calibration anchors than it needs
    InsufficientReferencePoints { available: usize, required: usize },
    /// The platform exposes no location capability
    PlatformUnavailable,
    /// The platform location source reported a failure
    Platform { source: LocationError },
    /// A configured value prevented the operation
    ConfigurationError { parameter: String, value: String },
}

impl fmt::Display for GpsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpsError::InsufficientReferencePoints {
                available,
                required,
            } => write!(
                f,
                "insufficient reference points: {} available, {} required",
                available, required
            ),
            GpsError::PlatformUnavailable => write!(f, "location capability not available"),
            GpsError::Platform { source } => write!(f, "platform location error: {}", source),
            GpsError::ConfigurationError { parameter, value } => {
                write!(f, "configuration error: {} = {}", parameter, value)
            }
        }
    }
}

impl std::error::Error for GpsError {}

impl From<TransformError> for GpsError {
    fn from(error: TransformError) -> Self {
        match error {
            TransformError::InsufficientReferencePoints {
                available,
                required,
            } => GpsError::InsufficientReferencePoints {
                available,
                required,
            },
        }
    }
}

impl From<LocationError> for GpsError {
    fn from(error: LocationError) -> Self {
        match error {
            LocationError::Unavailable => GpsError::PlatformUnavailable,
            other => GpsError::Platform { source: other },
        }
    }
}

/// Events emitted to registered observers, fire-and-forget
#[derive(Debug, Clone, PartialEq)]
pub enum GpsEvent {
    /// A reading passed the full pipeline and the current position moved
    PositionUpdate { position: CurrentPosition },
    /// A platform-level failure during continuous tracking
    Error { message: String },
    TrackingStarted,
    TrackingStopped,
}

/// Callback function type for tracker events
pub type EventCallback = Box<dyn Fn(GpsEvent) + Send>;

/// Handle returned by callback registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(u32);

impl CallbackHandle {
    pub(crate) fn new(id: u32) -> Self {
        CallbackHandle(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Result of enabling the testing/calibration mode
#[derive(Debug, Clone, PartialEq)]
pub struct TestingActivation {
    /// Where the device actually is
    pub real_location: GeoCoordinate,
    /// The marker the device position is mapped onto
    pub mapped_marker: MapMarker,
    /// Constant offset added to every raw reading while enabled
    pub offset: GeoCoordinate,
}

/// Current state of the testing/calibration mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestingStatus {
    pub enabled: bool,
    pub real_location: Option<GeoCoordinate>,
    pub offset: GeoCoordinate,
}
