use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::{
    error::TrackerError,
    geo::geo_point::GeoPoint,
    passenger::{annotated_bus::AnnotatedBus, passenger_matcher::PassengerMatcher},
    store::{
        position_snapshot::PositionSnapshot, position_store::RealtimePositionStore,
        subscription::Subscription,
    },
};

pub type BusListCallback = Box<dyn FnMut(&[AnnotatedBus]) + Send + 'static>;

struct FeedState {
    matcher: PassengerMatcher,
    last_snapshot: Option<PositionSnapshot>,
    display: BusListCallback,
}

impl FeedState {
    fn emit(&mut self) {
        if let Some(snapshot) = &self.last_snapshot {
            let buses = self.matcher.on_snapshot(snapshot);
            (self.display)(&buses);
        }
    }
}

/// A live passenger view: every store snapshot, and every change of the
/// passenger's own position, yields a fresh bus list.
///
/// Dropping the feed unsubscribes from the store.
pub struct PassengerFeed {
    state: Arc<Mutex<FeedState>>,
    subscription: Subscription,
}

impl PassengerFeed {
    /// `display` is called with the current list before this returns.
    pub fn subscribe(
        store: &dyn RealtimePositionStore,
        matcher: PassengerMatcher,
        display: BusListCallback,
    ) -> Result<Self, TrackerError> {
        let state = Arc::new(Mutex::new(FeedState {
            matcher,
            last_snapshot: None,
            display,
        }));

        let feed_state = Arc::clone(&state);
        let subscription = store.subscribe(Box::new(move |snapshot: &PositionSnapshot| {
            let mut state = feed_state.lock();
            state.last_snapshot = Some(snapshot.clone());
            state.emit();
        }))?;

        debug!("Passenger feed subscribed");

        Ok(PassengerFeed {
            state,
            subscription,
        })
    }

    /// Recomputes every ETA against the new position using the last snapshot.
    pub fn set_reference_position(&self, position: Option<GeoPoint>) {
        let mut state = self.state.lock();
        state.matcher.set_reference_position(position);
        state.emit();
    }

    pub fn reference_position(&self) -> Option<GeoPoint> {
        self.state.lock().matcher.reference_position()
    }

    pub fn unsubscribe(self) {
        self.subscription.unsubscribe();
    }
}
