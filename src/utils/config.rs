//! Injected configuration for the GPS mapper
//!
//! Everything tunable lives here and is passed into the tracker at
//! construction time: calibration reference points, proximity markers, and
//! the filter/tracking parameters. Configuration is read-only to the core.

use crate::core::{
    MapMarker, ReferencePoint, CACHE_PRUNE_FRACTION, DEFAULT_CACHE_CAPACITY,
    DEFAULT_HISTORY_CAPACITY, DEFAULT_HISTORY_MAX_AGE_MS, DEFAULT_MAINTENANCE_INTERVAL_MS,
    DEFAULT_MAX_ACCURACY_M, DEFAULT_MAX_JUMP_M, DEFAULT_RETRY_BACKOFF_MS, DEFAULT_RETRY_COUNT,
    DEFAULT_SMOOTHING_ALPHA, DEFAULT_THROTTLE_INTERVAL_MS,
};
use crate::location::LocationRequestOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Configuration loading and validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    IoError { message: String },
    ParseError { message: String },
    InvalidParameter { parameter: String, value: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError { message } => write!(f, "config I/O error: {}", message),
            ConfigError::ParseError { message } => write!(f, "config parse error: {}", message),
            ConfigError::InvalidParameter {
                parameter,
                value,
                reason,
            } => write!(f, "invalid config parameter {} = {}: {}", parameter, value, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Position filter tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Exponential smoothing factor, weight of the newest reading
    pub smoothing_alpha: f64,
    /// Readings with worse reported accuracy are rejected (meters)
    pub max_accuracy_m: f64,
    /// Readings further than this from the last accepted one are rejected (meters)
    pub max_jump_m: f64,
    /// Bound on the recent-position history
    pub history_capacity: usize,
    /// History entries older than this are pruned during maintenance (milliseconds)
    pub history_max_age_ms: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            smoothing_alpha: DEFAULT_SMOOTHING_ALPHA,
            max_accuracy_m: DEFAULT_MAX_ACCURACY_M,
            max_jump_m: DEFAULT_MAX_JUMP_M,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            history_max_age_ms: DEFAULT_HISTORY_MAX_AGE_MS,
        }
    }
}

/// Tracking controller tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Minimum interval between processed updates (milliseconds)
    pub throttle_interval_ms: u64,
    /// Interval between cache/history maintenance passes (milliseconds)
    pub maintenance_interval_ms: u64,
    /// Attempts for a one-shot location request
    pub retry_count: u32,
    /// Backoff unit between one-shot retries (milliseconds, scaled linearly)
    pub retry_backoff_ms: u64,
    /// Platform options for continuous watches
    pub watch_options: LocationRequestOptions,
    /// Platform options for one-shot requests
    pub one_shot_options: LocationRequestOptions,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            throttle_interval_ms: DEFAULT_THROTTLE_INTERVAL_MS,
            maintenance_interval_ms: DEFAULT_MAINTENANCE_INTERVAL_MS,
            retry_count: DEFAULT_RETRY_COUNT,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            watch_options: LocationRequestOptions::watch(),
            one_shot_options: LocationRequestOptions::one_shot(),
        }
    }
}

/// Complete injected configuration for the mapper subsystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Calibration anchors pairing GPS coordinates with local map coordinates
    pub reference_points: Vec<ReferencePoint>,
    /// Named proximity points of interest
    pub markers: Vec<MapMarker>,
    pub filter: FilterConfig,
    pub tracking: TrackingConfig,
    /// Bound on the transform result cache
    pub cache_capacity: usize,
    /// Fraction of oldest cache entries dropped during maintenance
    pub cache_prune_fraction: f64,
}

impl Default for MapperConfig {
    fn default() -> Self {
        // Calibration values of the garden map this subsystem shipped with
        Self {
            reference_points: vec![
                ReferencePoint { lat: 51.492060, lng: 11.956057, x: 15.0, y: 55.0 },
                ReferencePoint { lat: 51.491434, lng: 11.956762, x: 50.0, y: 65.0 },
                ReferencePoint { lat: 51.490917, lng: 11.956818, x: 105.0, y: 80.0 },
            ],
            markers: vec![
                MapMarker { id: "redCircle1".to_string(), lat: 51.492060, lng: 11.956057, radius_m: 40.0 },
                MapMarker { id: "redCircle2".to_string(), lat: 51.491434, lng: 11.956762, radius_m: 40.0 },
                MapMarker { id: "redCircle3".to_string(), lat: 51.490917, lng: 11.956818, radius_m: 40.0 },
            ],
            filter: FilterConfig::default(),
            tracking: TrackingConfig::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_prune_fraction: CACHE_PRUNE_FRACTION,
        }
    }
}

impl MapperConfig {
    /// Load and validate a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("failed to read config file '{}': {}", path_str, e),
        })?;

        let config: MapperConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
                message: format!("failed to parse config file '{}': {}", path_str, e),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Range checks on all tunables
    pub fn validate(&self) -> Result<(), ConfigError> {
        let alpha = self.filter.smoothing_alpha;
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "filter.smoothing_alpha".to_string(),
                value: alpha.to_string(),
                reason: "smoothing factor must be in (0, 1]".to_string(),
            });
        }
        if self.filter.max_accuracy_m <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "filter.max_accuracy_m".to_string(),
                value: self.filter.max_accuracy_m.to_string(),
                reason: "accuracy threshold must be positive".to_string(),
            });
        }
        if self.filter.max_jump_m <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "filter.max_jump_m".to_string(),
                value: self.filter.max_jump_m.to_string(),
                reason: "jump threshold must be positive".to_string(),
            });
        }
        if self.filter.history_capacity == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "filter.history_capacity".to_string(),
                value: "0".to_string(),
                reason: "history must hold at least one entry".to_string(),
            });
        }
        if self.tracking.throttle_interval_ms == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "tracking.throttle_interval_ms".to_string(),
                value: "0".to_string(),
                reason: "throttle interval must be positive".to_string(),
            });
        }
        if self.tracking.retry_count == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "tracking.retry_count".to_string(),
                value: "0".to_string(),
                reason: "one-shot requests need at least one attempt".to_string(),
            });
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "cache_capacity".to_string(),
                value: "0".to_string(),
                reason: "transform cache must hold at least one entry".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.cache_prune_fraction) {
            return Err(ConfigError::InvalidParameter {
                parameter: "cache_prune_fraction".to_string(),
                value: self.cache_prune_fraction.to_string(),
                reason: "prune fraction must be in [0, 1]".to_string(),
            });
        }
        Ok(())
    }
}
