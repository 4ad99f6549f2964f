//! Geographic-to-local coordinate transformation via inverse distance weighting
//!
//! The map image is rotated and hand-calibrated, so the transform is anchored
//! on a small set of reference points pairing GPS coordinates with local map
//! coordinates. IDW gives a smooth interpolant that is exact at every anchor
//! and needs no matrix inversion, which suits an irregular, hand-placed
//! anchor set.

use crate::core::{LocalPosition, ReferencePoint, IDW_EPSILON, MIN_REFERENCE_POINTS};
use crate::processing::cache::TransformCache;
use nalgebra::Vector2;
use std::fmt;

/// Error produced by the coordinate transformer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// Fewer reference points loaded than the interpolation requires
    InsufficientReferencePoints { available: usize, required: usize },
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::InsufficientReferencePoints {
                available,
                required,
            } => write!(
                f,
                "insufficient reference points: {} available, {} required",
                available, required
            ),
        }
    }
}

impl std::error::Error for TransformError {}

/// Reference point store plus IDW interpolator with a bounded result cache.
///
/// The store keeps points in insertion order; the order is irrelevant to the
/// math but makes cached results deterministic. Any change to the store
/// invalidates the whole cache.
pub struct CoordinateTransformer {
    reference_points: Vec<ReferencePoint>,
    cache: TransformCache,
}

impl Default for CoordinateTransformer {
    fn default() -> Self {
        Self::new(TransformCache::default())
    }
}

impl CoordinateTransformer {
    pub fn new(cache: TransformCache) -> Self {
        Self {
            reference_points: Vec::new(),
            cache,
        }
    }

    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self::new(TransformCache::with_capacity(capacity))
    }

    /// Append a calibration anchor. Always succeeds; invalidates the cache.
    pub fn add_reference_point(&mut self, lat: f64, lng: f64, x: f64, y: f64) {
        self.reference_points.push(ReferencePoint { lat, lng, x, y });
        self.cache.clear();
    }

    /// Remove all anchors and invalidate the cache
    pub fn clear_reference_points(&mut self) {
        self.reference_points.clear();
        self.cache.clear();
    }

    pub fn reference_point_count(&self) -> usize {
        self.reference_points.len()
    }

    /// Map a geographic coordinate into the local map space.
    ///
    /// Cache lookup happens on the input rounded to five decimal places; a
    /// hit returns the stored result verbatim. On a miss each anchor is
    /// weighted by the inverse of its Euclidean distance in degree space and
    /// the weighted mean of the local coordinates is returned and cached.
    pub fn transform(&mut self, lat: f64, lng: f64) -> Result<LocalPosition, TransformError> {
        if self.reference_points.len() < MIN_REFERENCE_POINTS {
            return Err(TransformError::InsufficientReferencePoints {
                available: self.reference_points.len(),
                required: MIN_REFERENCE_POINTS,
            });
        }

        let key = TransformCache::key_for(lat, lng);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let mut weighted = Vector2::zeros();
        let mut total_weight = 0.0;

        for point in &self.reference_points {
            let d_lat = lat - point.lat;
            let d_lng = lng - point.lng;
            let distance = (d_lat * d_lat + d_lng * d_lng).sqrt();

            let weight = 1.0 / (distance + IDW_EPSILON);
            weighted += Vector2::new(point.x, point.y) * weight;
            total_weight += weight;
        }

        let local = weighted / total_weight;
        let result = LocalPosition {
            x: local.x,
            y: local.y,
        };

        self.cache.insert(key, result);
        Ok(result)
    }

    /// Drop the oldest cached results; called from periodic maintenance
    pub fn prune_cache(&mut self, fraction: f64) {
        self.cache.prune_fraction(fraction);
    }

    /// Hit count, miss count, and hit rate of the result cache
    pub fn cache_statistics(&self) -> (usize, usize, f64) {
        self.cache.statistics()
    }
}
