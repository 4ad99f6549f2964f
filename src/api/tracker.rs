//! Tracking controller: lifecycle, throttling, batching, and notifications
//!
//! The controller is pump-driven: the owner calls `process` regularly with
//! the current time and all location updates, batch flushes, and maintenance
//! run as serialized steps inside that call. There is no parallelism, so no
//! locking is needed around the cache, history, or current position.

use crate::algorithms::{proximity, CoordinateTransformer};
use crate::api::types::{
    CallbackHandle, EventCallback, GpsError, GpsEvent, GpsResult, TestingActivation, TestingStatus,
};
use crate::core::{CurrentPosition, GeoCoordinate, RawReading};
use crate::location::{LocationError, LocationSource, WatchId};
use crate::processing::PositionFilter;
use crate::utils::MapperConfig;
use std::collections::HashMap;
use std::thread;
use std::time::Duration;

/// Testing/calibration session state, owned by the tracker
struct TestingState {
    enabled: bool,
    real_location: Option<GeoCoordinate>,
    offset: GeoCoordinate,
}

impl Default for TestingState {
    fn default() -> Self {
        Self {
            enabled: false,
            real_location: None,
            offset: GeoCoordinate::new(0.0, 0.0),
        }
    }
}

/// GPS tracking controller.
///
/// Owns the transformer, filter, current position, pending batch, and the
/// testing-mode session state. Observers register callbacks and receive
/// position-update, error, and tracking-state events fire-and-forget.
pub struct GpsTracker {
    source: Box<dyn LocationSource>,
    transformer: CoordinateTransformer,
    filter: PositionFilter,
    config: MapperConfig,
    testing: TestingState,

    tracking: bool,
    watch: Option<WatchId>,
    current_position: Option<CurrentPosition>,
    nearby_markers: Vec<String>,

    /// Time of the last processed update, the throttle reference
    last_processed_ms: Option<u64>,
    /// Readings held back by the throttle, flushed once per window
    pending_batch: Vec<RawReading>,
    /// Deadline of the armed batch flush, if one is scheduled
    flush_due_ms: Option<u64>,
    last_maintenance_ms: Option<u64>,

    callbacks: HashMap<CallbackHandle, EventCallback>,
    callback_counter: u32,
}

impl GpsTracker {
    pub fn new(source: Box<dyn LocationSource>, config: MapperConfig) -> Self {
        let mut transformer = CoordinateTransformer::with_cache_capacity(config.cache_capacity);
        for point in &config.reference_points {
            transformer.add_reference_point(point.lat, point.lng, point.x, point.y);
        }
        let filter = PositionFilter::new(config.filter.clone());

        Self {
            source,
            transformer,
            filter,
            config,
            testing: TestingState::default(),
            tracking: false,
            watch: None,
            current_position: None,
            nearby_markers: Vec::new(),
            last_processed_ms: None,
            pending_batch: Vec::new(),
            flush_due_ms: None,
            last_maintenance_ms: None,
            callbacks: HashMap::new(),
            callback_counter: 0,
        }
    }

    /// Register an event callback; returns the handle for unregistration
    pub fn register_callback(&mut self, callback: EventCallback) -> CallbackHandle {
        self.callback_counter += 1;
        let handle = CallbackHandle::new(self.callback_counter);
        self.callbacks.insert(handle, callback);
        handle
    }

    /// Remove a previously registered callback
    pub fn unregister_callback(&mut self, handle: CallbackHandle) -> bool {
        self.callbacks.remove(&handle).is_some()
    }

    fn emit(&self, event: GpsEvent) {
        for callback in self.callbacks.values() {
            callback(event.clone());
        }
    }

    /// Begin continuous tracking. A no-op success when already tracking;
    /// fails without changing state when the platform has no location
    /// capability.
    pub fn start_tracking(&mut self) -> GpsResult<()> {
        if self.tracking {
            return Ok(());
        }
        if !self.source.is_available() {
            return Err(GpsError::PlatformUnavailable);
        }

        let watch = self.source.watch(&self.config.tracking.watch_options)?;

        self.filter.reset();
        self.watch = Some(watch);
        self.tracking = true;
        self.emit(GpsEvent::TrackingStarted);
        Ok(())
    }

    /// Stop continuous tracking. Idempotent. Cancels the platform watch and
    /// any armed batch flush synchronously, so a flush that was due can no
    /// longer land after this returns.
    pub fn stop_tracking(&mut self) {
        if let Some(watch) = self.watch.take() {
            self.source.clear_watch(watch);
        }
        self.pending_batch.clear();
        self.flush_due_ms = None;
        self.last_processed_ms = None;
        self.current_position = None;
        self.nearby_markers.clear();

        if self.tracking {
            self.tracking = false;
            self.emit(GpsEvent::TrackingStopped);
        }
    }

    /// Pump the controller: settle a due batch flush, drain watch readings,
    /// and run periodic maintenance. Call regularly with the current time in
    /// milliseconds since the epoch.
    ///
    /// The flush runs before incoming readings are handled so a stale queued
    /// reading can never land after a newer one; processed updates therefore
    /// stay in non-decreasing timestamp order. A flush armed during this
    /// call has its deadline a full window ahead, so it is never due within
    /// the same call.
    pub fn process(&mut self, now_ms: u64) {
        if self.tracking {
            self.flush_batch_if_due(now_ms);

            let mut incoming = Vec::new();
            if let Some(watch) = self.watch {
                while let Some(result) = self.source.poll(watch) {
                    incoming.push(result);
                }
            }

            for result in incoming {
                match result {
                    Ok(reading) => {
                        let reading = self.offset_applied(reading);
                        self.handle_reading(reading, now_ms);
                    }
                    Err(error) => self.emit(GpsEvent::Error {
                        message: error.to_string(),
                    }),
                }
            }
        }

        self.run_maintenance(now_ms);
    }

    /// Route one raw reading through the throttle
    fn handle_reading(&mut self, reading: RawReading, now_ms: u64) {
        let throttled = self
            .last_processed_ms
            .map(|last| now_ms.saturating_sub(last) < self.config.tracking.throttle_interval_ms)
            .unwrap_or(false);

        if throttled {
            self.pending_batch.push(reading);
            if self.flush_due_ms.is_none() {
                // One flush per throttle window, at the end of the window
                let last = self.last_processed_ms.unwrap_or(now_ms);
                self.flush_due_ms = Some(last + self.config.tracking.throttle_interval_ms);
            }
        } else if let Err(error) = self.run_pipeline(&reading, now_ms) {
            self.emit(GpsEvent::Error {
                message: error.to_string(),
            });
        }
    }

    /// Flush the pending batch once its deadline has passed: discard
    /// invalids, process only the most recent remaining reading
    fn flush_batch_if_due(&mut self, now_ms: u64) {
        let due = matches!(self.flush_due_ms, Some(deadline) if now_ms >= deadline);
        if !due {
            return;
        }
        self.flush_due_ms = None;

        let batch = std::mem::take(&mut self.pending_batch);
        let newest_valid = batch
            .into_iter()
            .filter(|r| self.filter.is_valid_reading(r.lat, r.lng, r.accuracy))
            .max_by_key(|r| r.timestamp_ms);

        if let Some(reading) = newest_valid {
            if let Err(error) = self.run_pipeline(&reading, now_ms) {
                self.emit(GpsEvent::Error {
                    message: error.to_string(),
                });
            }
        }
    }

    /// Validate, smooth, transform, and publish one reading.
    ///
    /// An invalid reading is dropped silently and returns `Ok(None)`; a
    /// single bad reading is not fatal to a session. A transform failure is
    /// returned for the caller to surface.
    fn run_pipeline(
        &mut self,
        reading: &RawReading,
        now_ms: u64,
    ) -> GpsResult<Option<CurrentPosition>> {
        if !self
            .filter
            .is_valid_reading(reading.lat, reading.lng, reading.accuracy)
        {
            return Ok(None);
        }

        let smoothed = self.filter.smooth(reading);
        let local = self.transformer.transform(smoothed.lat, smoothed.lng)?;

        let position = CurrentPosition {
            lat: smoothed.lat,
            lng: smoothed.lng,
            x: local.x,
            y: local.y,
            accuracy: smoothed.accuracy,
        };

        self.current_position = Some(position);
        self.nearby_markers = proximity::find_nearby(&position, &self.config.markers);
        self.last_processed_ms = Some(now_ms);
        // Anything still queued from before this reading is superseded
        self.pending_batch
            .retain(|queued| queued.timestamp_ms > reading.timestamp_ms);
        self.emit(GpsEvent::PositionUpdate { position });

        Ok(Some(position))
    }

    /// One-shot position request with bounded retry and linear backoff.
    /// A reading that fails validation surfaces as a position-unavailable
    /// error, since the caller asked for a concrete position.
    pub fn current_location(&mut self, now_ms: u64) -> GpsResult<CurrentPosition> {
        if !self.source.is_available() {
            return Err(GpsError::PlatformUnavailable);
        }

        let options = self.config.tracking.one_shot_options;
        let attempts = self.config.tracking.retry_count.max(1);
        let mut last_error = LocationError::Timeout {
            timeout_ms: options.timeout_ms,
        };

        for attempt in 1..=attempts {
            match self.source.current_reading(&options) {
                Ok(reading) => {
                    let reading = self.offset_applied(reading);
                    return match self.run_pipeline(&reading, now_ms)? {
                        Some(position) => Ok(position),
                        None => Err(GpsError::Platform {
                            source: LocationError::PositionUnavailable {
                                details: "reading rejected by position filter".to_string(),
                            },
                        }),
                    };
                }
                Err(error) => {
                    last_error = error;
                    if attempt < attempts {
                        let backoff =
                            self.config.tracking.retry_backoff_ms * u64::from(attempt);
                        if backoff > 0 {
                            thread::sleep(Duration::from_millis(backoff));
                        }
                    }
                }
            }
        }

        self.emit(GpsEvent::Error {
            message: last_error.to_string(),
        });
        Err(last_error.into())
    }

    /// Enable the testing/calibration mode: take one real platform reading
    /// and store the offset that maps it onto the first configured marker.
    /// While enabled, every raw reading has that offset added before it
    /// enters the filter pipeline.
    pub fn enable_testing_mode(&mut self) -> GpsResult<TestingActivation> {
        let marker = self
            .config
            .markers
            .first()
            .cloned()
            .ok_or(GpsError::ConfigurationError {
                parameter: "markers".to_string(),
                value: "empty".to_string(),
            })?;

        if !self.source.is_available() {
            return Err(GpsError::PlatformUnavailable);
        }

        let reading = self
            .source
            .current_reading(&self.config.tracking.one_shot_options)?;

        let real = GeoCoordinate::new(reading.lat, reading.lng);
        let offset = GeoCoordinate::new(marker.lat - real.lat, marker.lng - real.lng);

        self.testing = TestingState {
            enabled: true,
            real_location: Some(real),
            offset,
        };

        // Readings are now shifted into the marker frame; filter state and
        // queued readings from the unshifted frame would trip the jump check
        self.filter.reset();
        self.pending_batch.clear();
        self.flush_due_ms = None;

        Ok(TestingActivation {
            real_location: real,
            mapped_marker: marker,
            offset,
        })
    }

    /// Disable the testing mode; subsequent readings pass through unmodified
    pub fn disable_testing_mode(&mut self) {
        self.testing = TestingState::default();

        // The frame shifts back; drop state accumulated under the offset
        self.filter.reset();
        self.pending_batch.clear();
        self.flush_due_ms = None;
    }

    pub fn testing_status(&self) -> TestingStatus {
        TestingStatus {
            enabled: self.testing.enabled,
            real_location: self.testing.real_location,
            offset: self.testing.offset,
        }
    }

    fn offset_applied(&self, mut reading: RawReading) -> RawReading {
        if self.testing.enabled {
            reading.lat += self.testing.offset.lat;
            reading.lng += self.testing.offset.lng;
        }
        reading
    }

    /// Periodic cache and history pruning, serialized with the update flow
    fn run_maintenance(&mut self, now_ms: u64) {
        match self.last_maintenance_ms {
            None => self.last_maintenance_ms = Some(now_ms),
            Some(last)
                if now_ms.saturating_sub(last) >= self.config.tracking.maintenance_interval_ms =>
            {
                self.transformer.prune_cache(self.config.cache_prune_fraction);
                self.filter.prune_history(now_ms);
                self.last_maintenance_ms = Some(now_ms);
            }
            Some(_) => {}
        }
    }

    /// Append a calibration anchor; invalidates the transform cache
    pub fn add_reference_point(&mut self, lat: f64, lng: f64, x: f64, y: f64) {
        self.transformer.add_reference_point(lat, lng, x, y);
    }

    /// Remove all calibration anchors; invalidates the transform cache
    pub fn clear_reference_points(&mut self) {
        self.transformer.clear_reference_points();
    }

    pub fn current_position(&self) -> Option<CurrentPosition> {
        self.current_position
    }

    /// Marker IDs within range of the current position, refreshed after
    /// every successful update
    pub fn nearby_markers(&self) -> &[String] {
        &self.nearby_markers
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn is_available(&self) -> bool {
        self.source.is_available()
    }

    /// Hit count, miss count, and hit rate of the transform cache
    pub fn cache_statistics(&self) -> (usize, usize, f64) {
        self.transformer.cache_statistics()
    }

    /// Tear down the session: stop tracking and drop all callbacks and
    /// filter state
    pub fn destroy(&mut self) {
        self.stop_tracking();
        self.callbacks.clear();
        self.filter.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::MockLocationSource;
    use std::sync::{Arc, Mutex};

    fn test_config() -> MapperConfig {
        let mut config = MapperConfig::default();
        config.tracking.retry_backoff_ms = 0;
        config
    }

    fn tracker_with(
        config: MapperConfig,
    ) -> (GpsTracker, MockLocationSource, Arc<Mutex<Vec<GpsEvent>>>) {
        let source = MockLocationSource::new();
        let mut tracker = GpsTracker::new(Box::new(source.clone()), config);

        let events: Arc<Mutex<Vec<GpsEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        tracker.register_callback(Box::new(move |event| {
            sink.lock().unwrap().push(event);
        }));

        (tracker, source, events)
    }

    fn position_updates(events: &Arc<Mutex<Vec<GpsEvent>>>) -> Vec<CurrentPosition> {
        events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                GpsEvent::PositionUpdate { position } => Some(*position),
                _ => None,
            })
            .collect()
    }

    // A reading near the first garden marker, inside all filter bounds
    fn garden_reading(timestamp_ms: u64) -> RawReading {
        RawReading::new(51.492060, 11.956057, timestamp_ms).with_accuracy(10.0)
    }

    #[test]
    fn test_start_fails_when_platform_unavailable() {
        let (mut tracker, source, events) = tracker_with(test_config());
        source.set_available(false);

        assert_eq!(tracker.start_tracking(), Err(GpsError::PlatformUnavailable));
        assert!(!tracker.is_tracking());
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_start_is_idempotent() {
        let (mut tracker, _source, events) = tracker_with(test_config());

        assert!(tracker.start_tracking().is_ok());
        assert!(tracker.start_tracking().is_ok());

        let starts = events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, GpsEvent::TrackingStarted))
            .count();
        assert_eq!(starts, 1);
    }

    #[test]
    fn test_reading_flows_through_pipeline() {
        let (mut tracker, source, events) = tracker_with(test_config());
        tracker.start_tracking().unwrap();

        source.push_reading(garden_reading(1_000));
        tracker.process(1_000);

        let position = tracker.current_position().expect("position set");
        // First reading sits exactly on the first reference point
        assert!((position.x - 15.0).abs() < 0.01);
        assert!((position.y - 55.0).abs() < 0.01);
        assert_eq!(tracker.nearby_markers(), ["redCircle1".to_string()]);
        assert_eq!(position_updates(&events).len(), 1);
    }

    #[test]
    fn test_throttled_readings_are_batched() {
        let (mut tracker, source, events) = tracker_with(test_config());
        tracker.start_tracking().unwrap();

        source.push_reading(garden_reading(1_000));
        tracker.process(1_000);

        // Inside the 500 ms window: both held back, no immediate update
        source.push_reading(RawReading::new(51.492062, 11.956059, 1_100).with_accuracy(10.0));
        source.push_reading(RawReading::new(51.492064, 11.956061, 1_200).with_accuracy(10.0));
        tracker.process(1_200);
        assert_eq!(position_updates(&events).len(), 1);

        // Window elapsed: one flush, processing only the newest valid reading
        tracker.process(1_600);
        let updates = position_updates(&events);
        assert_eq!(updates.len(), 2);
        assert!(updates[1].lat > updates[0].lat);
    }

    #[test]
    fn test_updates_are_emitted_in_reading_order() {
        let (mut tracker, source, events) = tracker_with(test_config());
        tracker.start_tracking().unwrap();

        // Readings drift steadily north; a stale flush would break the order
        source.push_reading(garden_reading(1_000));
        tracker.process(1_000);
        source.push_reading(RawReading::new(51.492070, 11.956057, 1_300).with_accuracy(10.0));
        tracker.process(1_300);
        tracker.process(1_700);
        source.push_reading(RawReading::new(51.492080, 11.956057, 1_800).with_accuracy(10.0));
        tracker.process(1_800);
        tracker.process(2_400);

        let updates = position_updates(&events);
        assert_eq!(updates.len(), 3);
        assert!(updates.windows(2).all(|w| w[1].lat > w[0].lat));
    }

    #[test]
    fn test_due_flush_settles_before_newer_readings() {
        let (mut tracker, source, events) = tracker_with(test_config());
        tracker.start_tracking().unwrap();

        source.push_reading(garden_reading(1_000));
        tracker.process(1_000);

        // Queued inside the window, flush armed for t=1500
        source.push_reading(RawReading::new(51.492070, 11.956057, 1_100).with_accuracy(10.0));
        tracker.process(1_100);

        // No pump ran at 1500; the overdue flush and a newer reading meet
        // in the same pump call
        source.push_reading(RawReading::new(51.492080, 11.956057, 1_600).with_accuracy(10.0));
        tracker.process(1_600);
        tracker.process(2_200);

        let updates = position_updates(&events);
        assert_eq!(updates.len(), 3);
        // The queued reading settled before the newer one; the emitted
        // positions never move backwards
        assert!(updates.windows(2).all(|w| w[1].lat > w[0].lat));
    }

    #[test]
    fn test_one_shot_supersedes_stale_queued_readings() {
        let (mut tracker, source, events) = tracker_with(test_config());
        tracker.start_tracking().unwrap();

        source.push_reading(garden_reading(1_000));
        tracker.process(1_000);
        source.push_reading(RawReading::new(51.492070, 11.956057, 1_100).with_accuracy(10.0));
        tracker.process(1_100);

        // A one-shot request lands a newer position while the old reading
        // still sits in the pending batch
        source.push_reading(RawReading::new(51.492080, 11.956057, 1_600).with_accuracy(10.0));
        let position = tracker.current_location(1_600).unwrap();

        // The overdue flush finds nothing left to replay
        tracker.process(1_700);

        let updates = position_updates(&events);
        assert_eq!(updates.len(), 2);
        assert!((updates[1].lat - position.lat).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_reading_dropped_silently() {
        let (mut tracker, source, events) = tracker_with(test_config());
        tracker.start_tracking().unwrap();

        source.push_reading(RawReading::new(95.0, 11.0, 1_000));
        tracker.process(1_000);

        assert!(tracker.current_position().is_none());
        let events = events.lock().unwrap();
        assert!(!events
            .iter()
            .any(|e| matches!(e, GpsEvent::PositionUpdate { .. } | GpsEvent::Error { .. })));
    }

    #[test]
    fn test_platform_error_surfaced_without_stopping() {
        let (mut tracker, source, events) = tracker_with(test_config());
        tracker.start_tracking().unwrap();

        source.push_error(LocationError::PermissionDenied);
        tracker.process(1_000);

        assert!(tracker.is_tracking());
        assert!(events
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, GpsEvent::Error { .. })));

        // The session keeps accepting readings after the error
        source.push_reading(garden_reading(2_000));
        tracker.process(2_000);
        assert!(tracker.current_position().is_some());
    }

    #[test]
    fn test_stop_cancels_pending_flush() {
        let (mut tracker, source, events) = tracker_with(test_config());
        tracker.start_tracking().unwrap();

        source.push_reading(garden_reading(1_000));
        tracker.process(1_000);
        source.push_reading(RawReading::new(51.492062, 11.956059, 1_100).with_accuracy(10.0));
        tracker.process(1_100);

        tracker.stop_tracking();
        assert!(tracker.current_position().is_none());

        // The flush that was armed for t=1500 must not land
        tracker.process(1_600);
        assert!(tracker.current_position().is_none());
        assert_eq!(position_updates(&events).len(), 1);
    }

    #[test]
    fn test_stop_is_idempotent_and_clears_watch() {
        let (mut tracker, source, events) = tracker_with(test_config());
        tracker.start_tracking().unwrap();
        assert!(source.has_active_watch());

        tracker.stop_tracking();
        tracker.stop_tracking();

        assert!(!source.has_active_watch());
        let stops = events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, GpsEvent::TrackingStopped))
            .count();
        assert_eq!(stops, 1);
    }

    #[test]
    fn test_one_shot_retries_until_success() {
        let (mut tracker, source, _events) = tracker_with(test_config());

        source.push_error(LocationError::Timeout { timeout_ms: 15_000 });
        source.push_error(LocationError::Timeout { timeout_ms: 15_000 });
        source.push_reading(garden_reading(1_000));

        let position = tracker.current_location(1_000).unwrap();
        assert!((position.x - 15.0).abs() < 0.01);
    }

    #[test]
    fn test_one_shot_surfaces_error_after_retries() {
        let (mut tracker, source, events) = tracker_with(test_config());

        for _ in 0..3 {
            source.push_error(LocationError::PermissionDenied);
        }

        let err = tracker.current_location(1_000).unwrap_err();
        assert_eq!(
            err,
            GpsError::Platform {
                source: LocationError::PermissionDenied,
            }
        );
        assert!(events
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, GpsEvent::Error { .. })));
    }

    #[test]
    fn test_one_shot_rejected_reading_is_an_error() {
        let (mut tracker, source, _events) = tracker_with(test_config());

        source.push_reading(RawReading::new(95.0, 11.0, 1_000));
        for _ in 0..2 {
            source.push_error(LocationError::Timeout { timeout_ms: 15_000 });
        }

        let err = tracker.current_location(1_000).unwrap_err();
        assert!(matches!(
            err,
            GpsError::Platform {
                source: LocationError::PositionUnavailable { .. },
            }
        ));
    }

    #[test]
    fn test_testing_mode_round_trip() {
        let (mut tracker, source, _events) = tracker_with(test_config());

        // Device is far away from the garden
        source.push_reading(RawReading::new(48.137154, 11.576124, 500));
        let activation = tracker.enable_testing_mode().unwrap();

        assert_eq!(activation.mapped_marker.id, "redCircle1");
        assert!(
            (activation.offset.lat - (51.492060 - 48.137154)).abs() < 1e-12
        );

        // A reading at the real device position now maps onto the marker
        source.push_reading(RawReading::new(48.137154, 11.576124, 1_000).with_accuracy(10.0));
        let position = tracker.current_location(1_000).unwrap();
        assert!((position.lat - 51.492060).abs() < 1e-9);
        assert!((position.lng - 11.956057).abs() < 1e-9);
        assert_eq!(tracker.nearby_markers(), ["redCircle1".to_string()]);
    }

    #[test]
    fn test_disable_testing_mode_resets_offset() {
        let (mut tracker, source, _events) = tracker_with(test_config());

        source.push_reading(RawReading::new(48.0, 11.0, 500));
        tracker.enable_testing_mode().unwrap();
        tracker.disable_testing_mode();

        let status = tracker.testing_status();
        assert!(!status.enabled);
        assert!(status.real_location.is_none());
        assert_eq!(status.offset, GeoCoordinate::new(0.0, 0.0));

        // Readings pass through unmodified again
        source.push_reading(garden_reading(1_000));
        let position = tracker.current_location(1_000).unwrap();
        assert!((position.lat - 51.492060).abs() < 1e-12);
    }

    #[test]
    fn test_tracking_survives_testing_mode_toggle() {
        let (mut tracker, source, events) = tracker_with(test_config());
        tracker.start_tracking().unwrap();

        // Session running at the far end of the garden
        source.push_reading(RawReading::new(51.490917, 11.956818, 1_000).with_accuracy(10.0));
        tracker.process(1_000);

        // Device is actually in another city
        source.push_reading(RawReading::new(48.137154, 11.576124, 1_500));
        tracker.enable_testing_mode().unwrap();

        // The offset shifts the coordinate frame; without a filter reset the
        // jump check would reject everything from here on
        source.push_reading(RawReading::new(48.137154, 11.576124, 2_000).with_accuracy(10.0));
        tracker.process(2_000);
        let updates = position_updates(&events);
        assert_eq!(updates.len(), 2);
        assert!((updates[1].lat - 51.492060).abs() < 1e-9);
        assert_eq!(tracker.nearby_markers(), ["redCircle1".to_string()]);

        // Same in reverse when the frame shifts back
        tracker.disable_testing_mode();
        source.push_reading(RawReading::new(48.137154, 11.576124, 2_600).with_accuracy(10.0));
        tracker.process(2_600);
        let updates = position_updates(&events);
        assert_eq!(updates.len(), 3);
        assert!((updates[2].lat - 48.137154).abs() < 1e-12);
    }

    #[test]
    fn test_restart_does_not_inherit_throttle_reference() {
        let (mut tracker, source, events) = tracker_with(test_config());
        tracker.start_tracking().unwrap();
        source.push_reading(garden_reading(1_000));
        tracker.process(1_000);

        tracker.stop_tracking();
        tracker.start_tracking().unwrap();

        // First reading of the new session, well inside the old session's
        // throttle window: processed immediately, not batched
        source.push_reading(garden_reading(1_100));
        tracker.process(1_100);

        assert_eq!(position_updates(&events).len(), 2);
        assert!(tracker.current_position().is_some());
    }

    #[test]
    fn test_testing_mode_requires_markers() {
        let mut config = test_config();
        config.markers.clear();
        let (mut tracker, _source, _events) = tracker_with(config);

        assert!(matches!(
            tracker.enable_testing_mode(),
            Err(GpsError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_testing_mode_propagates_platform_error() {
        let (mut tracker, source, _events) = tracker_with(test_config());
        source.push_error(LocationError::PermissionDenied);

        assert_eq!(
            tracker.enable_testing_mode(),
            Err(GpsError::Platform {
                source: LocationError::PermissionDenied,
            })
        );
        assert!(!tracker.testing_status().enabled);
    }

    #[test]
    fn test_maintenance_prunes_on_interval() {
        let (mut tracker, source, _events) = tracker_with(test_config());
        tracker.start_tracking().unwrap();

        source.push_reading(garden_reading(1_000));
        tracker.process(1_000);
        let (_, misses_before, _) = tracker.cache_statistics();
        assert_eq!(misses_before, 1);

        // Past the 60 s maintenance interval the oldest cache fraction and
        // stale history entries are dropped
        tracker.process(70_000);
        source.push_reading(RawReading::new(51.492060, 11.956057, 70_100).with_accuracy(10.0));
        tracker.process(70_100);
        assert!(tracker.current_position().is_some());
    }

    #[test]
    fn test_unregister_callback() {
        let (mut tracker, source, events) = tracker_with(test_config());
        // The helper registered handle 1; silence it
        assert!(tracker.unregister_callback(CallbackHandle::new(1)));
        assert!(!tracker.unregister_callback(CallbackHandle::new(1)));

        tracker.start_tracking().unwrap();
        source.push_reading(garden_reading(1_000));
        tracker.process(1_000);

        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_transform_failure_emits_error() {
        let (mut tracker, source, events) = tracker_with(test_config());
        tracker.clear_reference_points();
        tracker.start_tracking().unwrap();

        source.push_reading(garden_reading(1_000));
        tracker.process(1_000);

        assert!(tracker.current_position().is_none());
        assert!(events
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, GpsEvent::Error { .. })));
    }

    #[test]
    fn test_destroy_clears_session() {
        let (mut tracker, source, _events) = tracker_with(test_config());
        tracker.start_tracking().unwrap();
        source.push_reading(garden_reading(1_000));
        tracker.process(1_000);

        tracker.destroy();

        assert!(!tracker.is_tracking());
        assert!(tracker.current_position().is_none());
        assert!(!source.has_active_watch());
    }
}
