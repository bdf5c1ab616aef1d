use std::{
    cell::RefCell,
    sync::{Arc, Weak},
};

use jiff::Timestamp;
use parking_lot::ReentrantMutex;
use tracing::{debug, info, trace, warn};

use crate::{
    error::TrackerError,
    position_source::geo_position_source::{
        GeoPositionSource, PositionCallback, PositionErrorCallback, PositionFix, WatchId,
    },
    session::session_context::SessionContext,
    store::position_store::RealtimePositionStore,
    vehicle::{vehicle_meta::VehicleMeta, vehicle_record::VehicleRecord},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherState {
    Idle,
    Broadcasting,
}

struct PublisherInner {
    state: PublisherState,
    meta: Option<VehicleMeta>,
    watch_id: Option<WatchId>,
    // Bumped on every start and teardown. Callbacks from an older watch are ignored.
    generation: u64,
    last_error: Option<TrackerError>,
}

struct Shared<G> {
    inner: ReentrantMutex<RefCell<PublisherInner>>,
    store: Arc<dyn RealtimePositionStore>,
    source: Arc<G>,
    session: Option<SessionContext>,
}

impl<G: GeoPositionSource> Shared<G> {
    fn on_position(&self, generation: u64, fix: PositionFix) {
        let guard = self.inner.lock();

        let record = {
            let inner = guard.borrow();
            if inner.state != PublisherState::Broadcasting || inner.generation != generation {
                trace!(generation, "Ignoring position from a stopped broadcast");
                return;
            }
            let Some(meta) = inner.meta.clone() else {
                return;
            };
            VehicleRecord::new(meta, fix.point(), Timestamp::now())
        };

        // The lock stays held so a concurrent stop() cannot slip in between
        // this publish and its own removal.
        let vehicle_id = record.vehicle_id().clone();
        if let Err(error) = self.store.publish(&vehicle_id, record) {
            warn!(%error, vehicle_id = %vehicle_id, "Failed to publish vehicle position");
            guard.borrow_mut().last_error = Some(error);
        }
    }

    fn on_stream_error(&self, generation: u64, error: TrackerError) {
        let guard = self.inner.lock();

        {
            let mut inner = guard.borrow_mut();
            if inner.state != PublisherState::Broadcasting || inner.generation != generation {
                return;
            }
            warn!(%error, "Position stream failed, stopping broadcast");
            inner.last_error = Some(error);
        }

        if let Err(error) = self.teardown(&guard) {
            warn!(%error, "Failed to remove vehicle after stream failure");
        }
    }

    fn teardown(&self, inner: &RefCell<PublisherInner>) -> Result<(), TrackerError> {
        let (watch_id, meta) = {
            let mut inner = inner.borrow_mut();
            if inner.state == PublisherState::Idle {
                return Ok(());
            }
            inner.state = PublisherState::Idle;
            inner.generation += 1;
            (inner.watch_id.take(), inner.meta.clone())
        };

        if let Some(watch_id) = watch_id {
            self.source.clear_watch(watch_id);
        }

        if let Some(meta) = meta {
            self.store.remove(&meta.vehicle_id)?;
            info!(vehicle_id = %meta.vehicle_id, "Stopped broadcasting");
        }

        Ok(())
    }
}

/// Streams a driver's device position into the shared store under the
/// vehicle's id while broadcasting.
///
/// After [`DriverPublisher::stop`] returns no further position for the
/// vehicle reaches the store, and the vehicle's record is gone. Dropping the
/// publisher stops it.
///
/// Publishing holds the publisher lock while the store delivers to its
/// subscribers. A subscriber may call [`DriverPublisher::stop`] from its
/// callback on the delivering thread, but must not block on another thread
/// that calls `stop()` on the same publisher: that deadlocks.
pub struct DriverPublisher<G: GeoPositionSource> {
    shared: Arc<Shared<G>>,
}

impl<G: GeoPositionSource> DriverPublisher<G> {
    pub fn new(store: Arc<dyn RealtimePositionStore>, source: Arc<G>) -> Self {
        Self::build(store, source, None)
    }

    /// A publisher whose [`DriverPublisher::logout`] also clears the saved
    /// driver form.
    pub fn with_session(
        store: Arc<dyn RealtimePositionStore>,
        source: Arc<G>,
        session: SessionContext,
    ) -> Self {
        Self::build(store, source, Some(session))
    }

    fn build(
        store: Arc<dyn RealtimePositionStore>,
        source: Arc<G>,
        session: Option<SessionContext>,
    ) -> Self {
        DriverPublisher {
            shared: Arc::new(Shared {
                inner: ReentrantMutex::new(RefCell::new(PublisherInner {
                    state: PublisherState::Idle,
                    meta: None,
                    watch_id: None,
                    generation: 0,
                    last_error: None,
                })),
                store,
                source,
                session,
            }),
        }
    }

    /// Starts broadcasting. A no-op while already broadcasting.
    pub fn start(&self, meta: VehicleMeta) -> Result<(), TrackerError> {
        meta.validate()?;

        let guard = self.shared.inner.lock();
        let generation = {
            let mut inner = guard.borrow_mut();
            if inner.state == PublisherState::Broadcasting {
                debug!(vehicle_id = %meta.vehicle_id, "Already broadcasting");
                return Ok(());
            }
            inner.state = PublisherState::Broadcasting;
            inner.generation += 1;
            inner.meta = Some(meta);
            inner.last_error = None;
            inner.generation
        };

        let weak = Arc::downgrade(&self.shared);
        let on_update = position_callback(weak.clone(), generation);
        let on_error = error_callback(weak, generation);

        match self.shared.source.watch_position(on_update, on_error) {
            Ok(watch_id) => {
                let mut inner = guard.borrow_mut();
                if inner.generation == generation {
                    inner.watch_id = Some(watch_id);
                    if let Some(meta) = &inner.meta {
                        info!(vehicle_id = %meta.vehicle_id, "Started broadcasting");
                    }
                    return Ok(());
                }

                // Torn down while registering, by a stream error or a stop()
                // from a store subscriber.
                let error = inner.last_error.clone();
                drop(inner);
                self.shared.source.clear_watch(watch_id);
                match error {
                    Some(error) => Err(error),
                    None => Ok(()),
                }
            }
            Err(error) => {
                warn!(%error, "Could not watch device position");
                let mut inner = guard.borrow_mut();
                inner.state = PublisherState::Idle;
                inner.generation += 1;
                inner.meta = None;
                inner.last_error = Some(error.clone());
                Err(error)
            }
        }
    }

    /// Stops broadcasting and removes the vehicle from the store. Idempotent.
    pub fn stop(&self) -> Result<(), TrackerError> {
        let guard = self.shared.inner.lock();
        self.shared.teardown(&guard)
    }

    /// Stops, forgets the vehicle and clears the saved driver form.
    pub fn logout(&self) -> Result<(), TrackerError> {
        let guard = self.shared.inner.lock();
        let stopped = self.shared.teardown(&guard);
        guard.borrow_mut().meta = None;

        if let Some(session) = &self.shared.session {
            session.clear_driver()?;
        }
        info!("Driver logged out");

        stopped
    }

    pub fn state(&self) -> PublisherState {
        self.shared.inner.lock().borrow().state
    }

    pub fn is_broadcasting(&self) -> bool {
        self.state() == PublisherState::Broadcasting
    }

    pub fn meta(&self) -> Option<VehicleMeta> {
        self.shared.inner.lock().borrow().meta.clone()
    }

    /// The failure that last interrupted or refused a broadcast.
    pub fn last_error(&self) -> Option<TrackerError> {
        self.shared.inner.lock().borrow().last_error.clone()
    }
}

impl<G: GeoPositionSource> Drop for DriverPublisher<G> {
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            warn!(%error, "Failed to stop broadcast on drop");
        }
    }
}

fn position_callback<G: GeoPositionSource>(
    shared: Weak<Shared<G>>,
    generation: u64,
) -> PositionCallback {
    Box::new(move |fix: PositionFix| {
        if let Some(shared) = shared.upgrade() {
            shared.on_position(generation, fix);
        }
    })
}

fn error_callback<G: GeoPositionSource>(
    shared: Weak<Shared<G>>,
    generation: u64,
) -> PositionErrorCallback {
    Box::new(move |error: TrackerError| {
        if let Some(shared) = shared.upgrade() {
            shared.on_stream_error(generation, error);
        }
    })
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use crate::{
        geo::geo_point::GeoPoint,
        position_source::simulated_source::SimulatedPositionSource,
        session::{
            session_context::DriverSession, session_store::InMemorySessionStore,
        },
        store::{
            in_memory_store::InMemoryPositionStore, position_snapshot::PositionSnapshot,
        },
        test_utils::{create_vehicle_meta, vehicle_id},
    };

    use super::*;

    fn setup() -> (
        InMemoryPositionStore,
        Arc<SimulatedPositionSource>,
        DriverPublisher<SimulatedPositionSource>,
    ) {
        let store = InMemoryPositionStore::new();
        let source = Arc::new(SimulatedPositionSource::with_position(GeoPoint::new(
            12.90, 77.58,
        )));
        let publisher = DriverPublisher::new(Arc::new(store.clone()), Arc::clone(&source));
        (store, source, publisher)
    }

    #[test]
    fn start_publishes_current_position() {
        let (store, _source, publisher) = setup();

        publisher
            .start(create_vehicle_meta("bus-1", "Main", "Oak"))
            .unwrap();

        assert!(publisher.is_broadcasting());
        let snapshot = store.snapshot().unwrap();
        let record = snapshot.get(&vehicle_id("bus-1")).unwrap();
        assert_eq!(record.position, GeoPoint::new(12.90, 77.58));
        assert_eq!(record.route_label(), "Route bus-1");
    }

    #[test]
    fn moves_overwrite_the_record() {
        let (store, source, publisher) = setup();
        publisher
            .start(create_vehicle_meta("bus-1", "Main", "Oak"))
            .unwrap();

        source.move_to(GeoPoint::new(12.95, 77.60));

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.get(&vehicle_id("bus-1")).unwrap().position,
            GeoPoint::new(12.95, 77.60)
        );
    }

    #[test]
    fn stop_removes_record_and_ignores_late_fixes() {
        let (store, source, publisher) = setup();
        publisher
            .start(create_vehicle_meta("bus-1", "Main", "Oak"))
            .unwrap();

        publisher.stop().unwrap();
        source.move_to(GeoPoint::new(12.95, 77.60));
        publisher.stop().unwrap();

        assert_eq!(publisher.state(), PublisherState::Idle);
        assert!(store.snapshot().unwrap().is_empty());
        assert_eq!(source.watcher_count(), 0);
    }

    #[test]
    fn start_twice_keeps_one_watch() {
        let (_store, source, publisher) = setup();
        let meta = create_vehicle_meta("bus-1", "Main", "Oak");

        publisher.start(meta.clone()).unwrap();
        publisher.start(meta).unwrap();

        assert_eq!(source.watcher_count(), 1);
    }

    #[test]
    fn denied_position_refuses_to_start() {
        let (store, source, publisher) = setup();
        source.deny("User denied Geolocation");

        let result = publisher.start(create_vehicle_meta("bus-1", "Main", "Oak"));

        assert!(matches!(result, Err(TrackerError::PositionUnavailable(_))));
        assert_eq!(publisher.state(), PublisherState::Idle);
        assert_eq!(publisher.meta(), None);
        assert!(publisher.last_error().is_some());
        assert!(store.snapshot().unwrap().is_empty());
    }

    /// Keeps every position callback alive after `clear_watch`, like a
    /// platform that still has a fix in flight when the watch is cleared.
    #[derive(Default)]
    struct StickySource {
        callbacks: Mutex<Vec<PositionCallback>>,
    }

    impl StickySource {
        fn deliver(&self, point: GeoPoint) {
            for callback in self.callbacks.lock().iter_mut() {
                (*callback)(PositionFix::new(point, 5.0));
            }
        }
    }

    impl GeoPositionSource for StickySource {
        fn current_position(
            &self,
        ) -> impl Future<Output = Result<PositionFix, TrackerError>> + Send {
            std::future::ready(Err(TrackerError::PositionUnavailable(String::from(
                "no fix yet",
            ))))
        }

        fn watch_position(
            &self,
            on_update: PositionCallback,
            _on_error: PositionErrorCallback,
        ) -> Result<WatchId, TrackerError> {
            let mut callbacks = self.callbacks.lock();
            callbacks.push(on_update);
            Ok(WatchId::new(callbacks.len() as u64))
        }

        fn clear_watch(&self, _watch_id: WatchId) {}
    }

    #[test]
    fn late_fix_after_stop_is_not_published() {
        let store = InMemoryPositionStore::new();
        let source = Arc::new(StickySource::default());
        let publisher = DriverPublisher::new(Arc::new(store.clone()), Arc::clone(&source));

        publisher
            .start(create_vehicle_meta("bus-1", "Main", "Oak"))
            .unwrap();
        source.deliver(GeoPoint::new(12.90, 77.58));
        assert_eq!(store.snapshot().unwrap().len(), 1);

        publisher.stop().unwrap();
        source.deliver(GeoPoint::new(12.91, 77.59));
        assert!(store.snapshot().unwrap().is_empty());

        // Only the new watch publishes after a restart.
        publisher
            .start(create_vehicle_meta("bus-1", "Main", "Oak"))
            .unwrap();
        source.deliver(GeoPoint::new(12.92, 77.60));
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.get(&vehicle_id("bus-1")).unwrap().position,
            GeoPoint::new(12.92, 77.60)
        );
    }

    #[test]
    fn stream_failure_tears_down() {
        let (store, source, publisher) = setup();
        publisher
            .start(create_vehicle_meta("bus-1", "Main", "Oak"))
            .unwrap();

        source.fail(TrackerError::PositionUnavailable(String::from("signal lost")));

        assert_eq!(publisher.state(), PublisherState::Idle);
        assert_eq!(
            publisher.last_error(),
            Some(TrackerError::PositionUnavailable(String::from("signal lost")))
        );
        assert!(store.snapshot().unwrap().is_empty());
        assert_eq!(source.watcher_count(), 0);

        publisher
            .start(create_vehicle_meta("bus-1", "Main", "Oak"))
            .unwrap();
        assert!(publisher.is_broadcasting());
        assert_eq!(publisher.last_error(), None);
    }

    #[test]
    fn invalid_meta_is_rejected() {
        let (_store, source, publisher) = setup();
        let meta = create_vehicle_meta("bus-1", "", "Oak");

        assert!(matches!(
            publisher.start(meta),
            Err(TrackerError::InvalidRecord(_))
        ));
        assert_eq!(source.watcher_count(), 0);
    }

    #[test]
    fn subscriber_can_stop_publisher_from_callback() {
        let (store, source, publisher) = setup();
        let publisher = Arc::new(publisher);
        let seen = Arc::new(Mutex::new(Vec::<usize>::new()));

        let sink = Arc::clone(&seen);
        let weak_publisher = Arc::downgrade(&publisher);
        let _subscription = store
            .subscribe(Box::new(move |snapshot: &PositionSnapshot| {
                sink.lock().push(snapshot.len());
                if snapshot.len() == 1 {
                    if let Some(publisher) = weak_publisher.upgrade() {
                        publisher.stop().unwrap();
                    }
                }
            }))
            .unwrap();

        publisher
            .start(create_vehicle_meta("bus-1", "Main", "Oak"))
            .unwrap();
        source.move_to(GeoPoint::new(12.95, 77.60));

        assert_eq!(*seen.lock(), vec![0, 1, 0]);
        assert!(!publisher.is_broadcasting());
    }

    #[test]
    fn logout_clears_driver_session() {
        let store = InMemoryPositionStore::new();
        let source = Arc::new(SimulatedPositionSource::with_position(GeoPoint::new(
            12.90, 77.58,
        )));
        let session = SessionContext::new(Arc::new(InMemorySessionStore::new()));
        session
            .save_driver(&DriverSession {
                vehicle_name: String::from("bus-1"),
                starting_point: String::from("Main"),
                destination: String::from("Oak"),
                route: String::from("42"),
                city: None,
            })
            .unwrap();

        let publisher =
            DriverPublisher::with_session(Arc::new(store.clone()), source, session.clone());
        let meta = session.load_driver().unwrap().vehicle_meta().unwrap();
        publisher.start(meta).unwrap();
        assert_eq!(store.snapshot().unwrap().len(), 1);

        publisher.logout().unwrap();

        assert!(store.snapshot().unwrap().is_empty());
        assert_eq!(publisher.meta(), None);
        assert!(session.load_driver().is_err());
    }
}
