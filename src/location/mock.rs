//! Mock location source for testing and development

use crate::core::RawReading;
use crate::location::{LocationError, LocationRequestOptions, LocationResult, LocationSource, WatchId};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

struct MockState {
    available: bool,
    /// Scripted readings and errors, delivered front-first to both one-shot
    /// requests and watch polls
    queue: VecDeque<LocationResult<RawReading>>,
    active_watch: Option<WatchId>,
    next_watch_id: u32,
}

/// Scriptable location source. Clones share the same state, so a test can
/// keep one handle to feed readings while the tracker owns the other.
#[derive(Clone)]
pub struct MockLocationSource {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockLocationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLocationSource {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                available: true,
                queue: VecDeque::new(),
                active_watch: None,
                next_watch_id: 0,
            })),
        }
    }

    /// Queue a reading for delivery
    pub fn push_reading(&self, reading: RawReading) {
        self.state.lock().unwrap().queue.push_back(Ok(reading));
    }

    /// Queue a platform error for delivery
    pub fn push_error(&self, error: LocationError) {
        self.state.lock().unwrap().queue.push_back(Err(error));
    }

    /// Simulate presence or absence of the location capability
    pub fn set_available(&self, available: bool) {
        self.state.lock().unwrap().available = available;
    }

    pub fn queued_count(&self) -> usize {
        self.state.lock().unwrap().queue.len()
    }

    pub fn has_active_watch(&self) -> bool {
        self.state.lock().unwrap().active_watch.is_some()
    }
}

impl LocationSource for MockLocationSource {
    fn is_available(&self) -> bool {
        self.state.lock().unwrap().available
    }

    fn current_reading(&mut self, options: &LocationRequestOptions) -> LocationResult<RawReading> {
        let mut state = self.state.lock().unwrap();
        if !state.available {
            return Err(LocationError::Unavailable);
        }
        match state.queue.pop_front() {
            Some(result) => result,
            None => Err(LocationError::Timeout {
                timeout_ms: options.timeout_ms,
            }),
        }
    }

    fn watch(&mut self, _options: &LocationRequestOptions) -> LocationResult<WatchId> {
        let mut state = self.state.lock().unwrap();
        if !state.available {
            return Err(LocationError::Unavailable);
        }
        state.next_watch_id += 1;
        let id = WatchId::new(state.next_watch_id);
        state.active_watch = Some(id);
        Ok(id)
    }

    fn poll(&mut self, watch: WatchId) -> Option<LocationResult<RawReading>> {
        let mut state = self.state.lock().unwrap();
        if state.active_watch != Some(watch) {
            return None;
        }
        state.queue.pop_front()
    }

    fn clear_watch(&mut self, watch: WatchId) {
        let mut state = self.state.lock().unwrap();
        if state.active_watch == Some(watch) {
            state.active_watch = None;
        }
    }
}
