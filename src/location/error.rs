//! Error types for the platform location layer

use std::fmt;

/// Result type for location source operations
pub type LocationResult<T> = Result<T, LocationError>;

/// Failures reported by the platform location source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// The platform exposes no location capability at all
    Unavailable,
    /// The user denied the location permission
    PermissionDenied,
    /// No reading arrived within the requested timeout
    Timeout { timeout_ms: u32 },
    /// The platform could not determine a position
    PositionUnavailable { details: String },
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationError::Unavailable => write!(f, "location capability not available"),
            LocationError::PermissionDenied => write!(f, "location permission denied"),
            LocationError::Timeout { timeout_ms } => {
                write!(f, "location request timed out after {} ms", timeout_ms)
            }
            LocationError::PositionUnavailable { details } => {
                write!(f, "position unavailable: {}", details)
            }
        }
    }
}

impl std::error::Error for LocationError {}
