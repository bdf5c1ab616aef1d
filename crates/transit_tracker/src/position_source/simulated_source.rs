use std::{future::Future, sync::Arc};

use fxhash::FxHashMap;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::{
    error::TrackerError,
    geo::geo_point::GeoPoint,
    position_source::geo_position_source::{
        GeoPositionSource, PositionCallback, PositionErrorCallback, PositionFix, WatchId,
    },
};

const SIMULATED_ACCURACY_METERS: f64 = 5.0;

struct Watcher {
    on_update: Mutex<PositionCallback>,
    on_error: Mutex<PositionErrorCallback>,
}

#[derive(Default)]
struct SimulatedState {
    current: Option<PositionFix>,
    denied: Option<String>,
    watchers: FxHashMap<WatchId, Arc<Watcher>>,
    next_watch_id: u64,
}

/// A [`GeoPositionSource`] driven by hand, for tests and demos.
///
/// Like a browser, a new watch immediately receives the current position when
/// one is known.
#[derive(Clone, Default)]
pub struct SimulatedPositionSource {
    state: Arc<Mutex<SimulatedState>>,
}

impl SimulatedPositionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(point: GeoPoint) -> Self {
        let source = Self::new();
        source.set_position(point);
        source
    }

    /// Updates the current position without notifying watchers.
    pub fn set_position(&self, point: GeoPoint) {
        self.state.lock().current = Some(PositionFix::new(point, SIMULATED_ACCURACY_METERS));
    }

    /// Makes every following request fail, as if the user denied access.
    pub fn deny(&self, reason: impl Into<String>) {
        self.state.lock().denied = Some(reason.into());
    }

    pub fn allow(&self) {
        self.state.lock().denied = None;
    }

    /// Moves the device and notifies every watcher.
    pub fn move_to(&self, point: GeoPoint) {
        let fix = PositionFix::new(point, SIMULATED_ACCURACY_METERS);
        self.state.lock().current = Some(fix);
        self.emit(fix);
    }

    pub fn emit(&self, fix: PositionFix) {
        for (watch_id, watcher) in self.watchers() {
            if self.is_watching(watch_id) {
                let mut on_update = watcher.on_update.lock();
                (*on_update)(fix);
            }
        }
    }

    /// Reports `error` to every watcher. Watches stay registered.
    pub fn fail(&self, error: TrackerError) {
        warn!(%error, "Simulated position stream failure");

        for (watch_id, watcher) in self.watchers() {
            if self.is_watching(watch_id) {
                let mut on_error = watcher.on_error.lock();
                (*on_error)(error.clone());
            }
        }
    }

    pub fn watcher_count(&self) -> usize {
        self.state.lock().watchers.len()
    }

    fn watchers(&self) -> Vec<(WatchId, Arc<Watcher>)> {
        let state = self.state.lock();
        let mut watchers: Vec<_> = state
            .watchers
            .iter()
            .map(|(&watch_id, watcher)| (watch_id, Arc::clone(watcher)))
            .collect();
        watchers.sort_by_key(|(watch_id, _)| *watch_id);
        watchers
    }

    fn is_watching(&self, watch_id: WatchId) -> bool {
        self.state.lock().watchers.contains_key(&watch_id)
    }
}

impl GeoPositionSource for SimulatedPositionSource {
    fn current_position(&self) -> impl Future<Output = Result<PositionFix, TrackerError>> + Send {
        let state = self.state.lock();
        let result = match (&state.denied, state.current) {
            (Some(reason), _) => Err(TrackerError::PositionUnavailable(reason.clone())),
            (None, Some(fix)) => Ok(fix),
            (None, None) => Err(TrackerError::PositionUnavailable(String::from(
                "no position fix available yet",
            ))),
        };

        std::future::ready(result)
    }

    fn watch_position(
        &self,
        on_update: PositionCallback,
        on_error: PositionErrorCallback,
    ) -> Result<WatchId, TrackerError> {
        let (watch_id, watcher, current) = {
            let mut state = self.state.lock();
            if let Some(reason) = &state.denied {
                return Err(TrackerError::PositionUnavailable(reason.clone()));
            }

            let watch_id = WatchId::new(state.next_watch_id);
            state.next_watch_id += 1;

            let watcher = Arc::new(Watcher {
                on_update: Mutex::new(on_update),
                on_error: Mutex::new(on_error),
            });
            state.watchers.insert(watch_id, Arc::clone(&watcher));

            (watch_id, watcher, state.current)
        };

        debug!(watch_id = watch_id.get(), "Watching simulated position");

        if let Some(fix) = current {
            let mut on_update = watcher.on_update.lock();
            (*on_update)(fix);
        }

        Ok(watch_id)
    }

    fn clear_watch(&self, watch_id: WatchId) {
        if self.state.lock().watchers.remove(&watch_id).is_some() {
            debug!(watch_id = watch_id.get(), "Cleared simulated position watch");
        }
    }
}
