//! Physical constants and tunable defaults for the GPS mapper

/// Mean earth radius for great-circle distance calculations (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Minimum number of reference points required before a transform is attempted
pub const MIN_REFERENCE_POINTS: usize = 3;

/// Offset added to inter-point distances during inverse distance weighting,
/// so a query landing exactly on a reference point does not divide by zero
pub const IDW_EPSILON: f64 = 1e-6;

/// Decimal places lat/lng are rounded to when building transform cache keys
pub const CACHE_KEY_PRECISION: usize = 5;

/// Default bound on the transform result cache (entries)
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Fraction of oldest cache entries dropped during periodic maintenance
pub const CACHE_PRUNE_FRACTION: f64 = 0.25;

/// Default exponential smoothing factor applied to accepted readings
pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.3;

/// Default maximum reported accuracy before a reading is rejected (meters)
pub const DEFAULT_MAX_ACCURACY_M: f64 = 100.0;

/// Default maximum distance from the last accepted reading before a new
/// reading is treated as a GPS spike and rejected (meters)
pub const DEFAULT_MAX_JUMP_M: f64 = 30.0;

/// Default capacity of the recent-position history
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// Default age after which history entries are pruned (milliseconds)
pub const DEFAULT_HISTORY_MAX_AGE_MS: u64 = 60_000;

/// Default minimum interval between processed tracking updates (milliseconds)
pub const DEFAULT_THROTTLE_INTERVAL_MS: u64 = 500;

/// Default interval between cache/history maintenance passes (milliseconds)
pub const DEFAULT_MAINTENANCE_INTERVAL_MS: u64 = 60_000;

/// Default number of attempts for a one-shot location request
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Default backoff unit between one-shot retries; the actual delay is
/// this value multiplied by the attempt number (milliseconds)
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1_000;
