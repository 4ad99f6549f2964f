//! Reading validation and exponential position smoothing

use crate::algorithms::geodesy::haversine_distance_m;
use crate::core::{GeoCoordinate, RawReading, SmoothedPosition};
use crate::utils::config::FilterConfig;
use std::collections::VecDeque;

/// Validates raw readings and smooths the accepted ones.
///
/// Validation is a boolean outcome, never an error: under normal GPS noise
/// readings fail routinely and a rejected reading must not interrupt a
/// tracking session. The last-valid reference used for the jump check only
/// moves when a reading is accepted into `smooth`.
pub struct PositionFilter {
    config: FilterConfig,
    /// Raw coordinates of the last accepted reading, for the jump check
    last_valid: Option<GeoCoordinate>,
    smoothed: Option<SmoothedPosition>,
    /// Recent accepted positions, oldest at the front
    history: VecDeque<SmoothedPosition>,
}

impl PositionFilter {
    pub fn new(config: FilterConfig) -> Self {
        let capacity = config.history_capacity;
        Self {
            config,
            last_valid: None,
            smoothed: None,
            history: VecDeque::with_capacity(capacity),
        }
    }

    /// Range, accuracy, and jump-distance checks on a raw reading
    pub fn is_valid_reading(&self, lat: f64, lng: f64, accuracy: Option<f64>) -> bool {
        if !lat.is_finite() || !lng.is_finite() {
            return false;
        }
        // The platform reports missing coordinates as zero
        if lat == 0.0 || lng == 0.0 {
            return false;
        }
        if lat.abs() > 90.0 || lng.abs() > 180.0 {
            return false;
        }

        if let Some(accuracy) = accuracy {
            if accuracy > self.config.max_accuracy_m {
                return false;
            }
        }

        if let Some(last) = self.last_valid {
            let jump = haversine_distance_m(last.lat, last.lng, lat, lng);
            if jump > self.config.max_jump_m {
                return false;
            }
        }

        true
    }

    /// Blend an accepted reading into the smoothed position.
    ///
    /// The first reading is adopted as-is; later readings are blended with
    /// the smoothing factor while accuracy and timestamp are replaced
    /// outright.
    pub fn smooth(&mut self, reading: &RawReading) -> SmoothedPosition {
        let alpha = self.config.smoothing_alpha;

        let next = match self.smoothed {
            None => SmoothedPosition {
                lat: reading.lat,
                lng: reading.lng,
                accuracy: reading.accuracy,
                timestamp_ms: reading.timestamp_ms,
            },
            Some(previous) => SmoothedPosition {
                lat: previous.lat * (1.0 - alpha) + reading.lat * alpha,
                lng: previous.lng * (1.0 - alpha) + reading.lng * alpha,
                accuracy: reading.accuracy,
                timestamp_ms: reading.timestamp_ms,
            },
        };

        self.smoothed = Some(next);
        self.last_valid = Some(GeoCoordinate::new(reading.lat, reading.lng));

        if self.history.len() >= self.config.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(next);

        next
    }

    /// Drop history entries older than the configured age; called from
    /// periodic maintenance
    pub fn prune_history(&mut self, now_ms: u64) {
        let max_age = self.config.history_max_age_ms;
        self.history
            .retain(|entry| now_ms.saturating_sub(entry.timestamp_ms) <= max_age);
    }

    /// Clear history, the last-valid marker, and the smoothed state.
    /// Invoked by the caller when tracking restarts or after signal loss.
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_valid = None;
        self.smoothed = None;
    }

    pub fn smoothed_position(&self) -> Option<SmoothedPosition> {
        self.smoothed
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> PositionFilter {
        PositionFilter::new(FilterConfig::default())
    }

    #[test]
    fn test_rejects_out_of_range_latitude() {
        let f = filter();
        assert!(!f.is_valid_reading(95.0, 11.0, None));
        assert!(!f.is_valid_reading(45.0, 190.0, None));
    }

    #[test]
    fn test_accepts_in_range_reading_without_prior() {
        let f = filter();
        assert!(f.is_valid_reading(45.0, 90.0, None));
    }

    #[test]
    fn test_rejects_zero_coordinates() {
        let f = filter();
        assert!(!f.is_valid_reading(0.0, 11.0, None));
        assert!(!f.is_valid_reading(51.0, 0.0, None));
        assert!(!f.is_valid_reading(f64::NAN, 11.0, None));
    }

    #[test]
    fn test_rejects_poor_accuracy() {
        let f = filter();
        assert!(!f.is_valid_reading(51.0, 11.0, Some(150.0)));
        assert!(f.is_valid_reading(51.0, 11.0, Some(20.0)));
    }

    #[test]
    fn test_jump_check_against_last_accepted() {
        let mut f = filter();
        f.smooth(&RawReading::new(51.0, 11.0, 1_000));

        // Roughly 500 m north of the last accepted reading
        assert!(!f.is_valid_reading(51.0045, 11.0, None));
        // Roughly 5 m north
        assert!(f.is_valid_reading(51.000045, 11.0, None));
    }

    #[test]
    fn test_rejection_does_not_move_last_valid() {
        let mut f = filter();
        f.smooth(&RawReading::new(51.0, 11.0, 1_000));

        assert!(!f.is_valid_reading(51.0045, 11.0, None));
        // Still judged against (51.0, 11.0)
        assert!(f.is_valid_reading(51.000045, 11.0, None));
    }

    #[test]
    fn test_first_reading_adopted_unchanged() {
        let mut f = filter();
        let smoothed = f.smooth(&RawReading::new(51.0, 11.0, 1_000));
        assert_eq!(smoothed.lat, 51.0);
        assert_eq!(smoothed.lng, 11.0);
    }

    #[test]
    fn test_exponential_blend() {
        let mut f = filter();
        f.smooth(&RawReading::new(51.0, 11.0, 1_000));
        let smoothed = f.smooth(&RawReading::new(51.001, 11.001, 2_000));

        // 51.0 * 0.7 + 51.001 * 0.3
        assert!((smoothed.lat - 51.0003).abs() < 1e-9);
        assert!((smoothed.lng - 11.0003).abs() < 1e-9);
        assert_eq!(smoothed.timestamp_ms, 2_000);
    }

    #[test]
    fn test_accuracy_replaced_not_blended() {
        let mut f = filter();
        f.smooth(&RawReading::new(51.0, 11.0, 1_000).with_accuracy(40.0));
        let smoothed = f.smooth(&RawReading::new(51.001, 11.0, 2_000).with_accuracy(10.0));
        assert_eq!(smoothed.accuracy, Some(10.0));
    }

    #[test]
    fn test_history_capacity_bound() {
        let mut f = filter();
        for i in 0..10 {
            f.smooth(&RawReading::new(51.0, 11.0, 1_000 + i));
        }
        assert_eq!(f.history_len(), FilterConfig::default().history_capacity);
    }

    #[test]
    fn test_history_pruned_by_age() {
        let mut f = filter();
        f.smooth(&RawReading::new(51.0, 11.0, 1_000));
        f.smooth(&RawReading::new(51.0, 11.0, 70_000));

        f.prune_history(100_000);

        assert_eq!(f.history_len(), 1);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut f = filter();
        f.smooth(&RawReading::new(51.0, 11.0, 1_000));
        f.reset();

        assert!(f.smoothed_position().is_none());
        assert_eq!(f.history_len(), 0);
        // Jump check no longer applies after reset
        assert!(f.is_valid_reading(52.0, 12.0, None));
    }
}
