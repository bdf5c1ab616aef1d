use std::{
    cell::RefCell,
    collections::{BTreeMap, VecDeque},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use parking_lot::{Mutex, ReentrantMutex};
use tracing::{debug, info};

use crate::{
    error::TrackerError,
    store::{
        position_snapshot::PositionSnapshot,
        position_store::{RealtimePositionStore, SnapshotCallback},
        subscription::Subscription,
    },
    vehicle::{vehicle_id::VehicleId, vehicle_record::VehicleRecord},
};

type SubscriptionId = u64;

struct Subscriber {
    active: AtomicBool,
    callback: Mutex<SnapshotCallback>,
}

impl Subscriber {
    fn deliver(&self, snapshot: &PositionSnapshot) {
        if !self.active.load(Ordering::Acquire) {
            return;
        }

        let mut callback = self.callback.lock();
        (*callback)(snapshot);
    }
}

struct Notification {
    snapshot: PositionSnapshot,
    targets: Vec<Arc<Subscriber>>,
}

#[derive(Default)]
struct DispatchQueue {
    pending: VecDeque<Notification>,
    draining: bool,
}

#[derive(Default)]
struct StoreState {
    records: PositionSnapshot,
    subscribers: BTreeMap<SubscriptionId, Arc<Subscriber>>,
    next_subscription_id: SubscriptionId,
}

struct Shared {
    state: Mutex<StoreState>,
    // Serializes every mutation together with the delivery of its snapshot.
    // Re-entrant so callbacks may publish, subscribe or unsubscribe; those
    // notifications are queued and drained by the outermost caller.
    dispatcher: ReentrantMutex<RefCell<DispatchQueue>>,
}

/// Resets the draining flag even if a callback panics.
struct DrainGuard<'a>(&'a RefCell<DispatchQueue>);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.borrow_mut().draining = false;
    }
}

impl Shared {
    fn new() -> Self {
        Shared {
            state: Mutex::new(StoreState::default()),
            dispatcher: ReentrantMutex::new(RefCell::new(DispatchQueue::default())),
        }
    }

    fn mutate<F>(&self, mutation: F)
    where
        F: FnOnce(&mut BTreeMap<VehicleId, VehicleRecord>),
    {
        let dispatcher = self.dispatcher.lock();

        let notification = {
            let mut state = self.state.lock();
            mutation(state.records.make_mut());
            Notification {
                snapshot: state.records.clone(),
                targets: state.subscribers.values().cloned().collect(),
            }
        };

        dispatcher.borrow_mut().pending.push_back(notification);
        Self::drain(&dispatcher);
    }

    fn drain(dispatcher: &RefCell<DispatchQueue>) {
        if dispatcher.borrow().draining {
            return;
        }

        dispatcher.borrow_mut().draining = true;
        let _guard = DrainGuard(dispatcher);

        loop {
            let next = dispatcher.borrow_mut().pending.pop_front();
            let Some(notification) = next else {
                break;
            };

            for subscriber in &notification.targets {
                subscriber.deliver(&notification.snapshot);
            }
        }
    }

    fn subscribe(&self, callback: SnapshotCallback) -> SubscriptionId {
        let dispatcher = self.dispatcher.lock();

        let (subscription_id, notification) = {
            let mut state = self.state.lock();
            let subscription_id = state.next_subscription_id;
            state.next_subscription_id += 1;

            let subscriber = Arc::new(Subscriber {
                active: AtomicBool::new(true),
                callback: Mutex::new(callback),
            });
            state
                .subscribers
                .insert(subscription_id, Arc::clone(&subscriber));

            (
                subscription_id,
                Notification {
                    snapshot: state.records.clone(),
                    targets: vec![subscriber],
                },
            )
        };

        debug!(subscription_id, "Subscribed to position store");

        dispatcher.borrow_mut().pending.push_back(notification);
        Self::drain(&dispatcher);

        subscription_id
    }

    fn unsubscribe(&self, subscription_id: SubscriptionId) {
        // Waits for deliveries in flight on other threads.
        let _dispatcher = self.dispatcher.lock();

        if let Some(subscriber) = self.state.lock().subscribers.remove(&subscription_id) {
            subscriber.active.store(false, Ordering::Release);
            debug!(subscription_id, "Unsubscribed from position store");
        }
    }
}

/// Process-local [`RealtimePositionStore`].
///
/// Safe to share between threads: the map sits behind a single mutex and
/// subscribers receive copy-on-write snapshots, never a partially updated map.
#[derive(Clone)]
pub struct InMemoryPositionStore {
    shared: Arc<Shared>,
}

impl Default for InMemoryPositionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPositionStore {
    pub fn new() -> Self {
        InMemoryPositionStore {
            shared: Arc::new(Shared::new()),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.state.lock().subscribers.len()
    }
}

impl RealtimePositionStore for InMemoryPositionStore {
    fn publish(&self, vehicle_id: &VehicleId, record: VehicleRecord) -> Result<(), TrackerError> {
        if record.vehicle_id() != vehicle_id {
            return Err(TrackerError::InvalidRecord(format!(
                "record for vehicle {} published under {vehicle_id}",
                record.vehicle_id()
            )));
        }
        record.validate()?;

        debug!(
            vehicle_id = %vehicle_id,
            lat = record.position.lat,
            lng = record.position.lng,
            "Publishing vehicle position"
        );

        self.shared.mutate(|records| {
            records.insert(vehicle_id.clone(), record);
        });

        Ok(())
    }

    fn remove(&self, vehicle_id: &VehicleId) -> Result<(), TrackerError> {
        self.shared.mutate(|records| {
            if records.remove(vehicle_id).is_some() {
                info!(vehicle_id = %vehicle_id, "Removed vehicle from position store");
            }
        });

        Ok(())
    }

    fn subscribe(&self, callback: SnapshotCallback) -> Result<Subscription, TrackerError> {
        let subscription_id = self.shared.subscribe(callback);
        let shared = Arc::downgrade(&self.shared);

        Ok(Subscription::new(move || {
            if let Some(shared) = shared.upgrade() {
                shared.unsubscribe(subscription_id);
            }
        }))
    }

    fn snapshot(&self) -> Result<PositionSnapshot, TrackerError> {
        Ok(self.shared.state.lock().records.clone())
    }
}
