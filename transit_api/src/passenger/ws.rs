use std::sync::Arc;

use axum::{
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use serde::Deserialize;
use tokio::sync::watch;
use tracing::{debug, warn};
use transit_tracker::{
    error::TrackerError,
    geo::geo_point::GeoPoint,
    passenger::{
        annotated_bus::AnnotatedBus, passenger_feed::PassengerFeed,
        passenger_matcher::PassengerMatcher,
    },
    store::position_store::RealtimePositionStore,
};

use crate::{error::ApiError, passenger::buses::PassengerQuery, state::AppState};

/// A position update sent by the passenger's device over the socket.
#[derive(Debug, Deserialize)]
struct ReferencePosition {
    lat: f64,
    lng: f64,
}

/// A feed over `store` whose reader only ever sees the most recent list.
fn latest_bus_lists(
    store: &dyn RealtimePositionStore,
    matcher: PassengerMatcher,
) -> Result<(PassengerFeed, watch::Receiver<Option<Vec<AnnotatedBus>>>), TrackerError> {
    let (sender, receiver) = watch::channel(None);
    let feed = PassengerFeed::subscribe(
        store,
        matcher,
        Box::new(move |buses: &[AnnotatedBus]| {
            sender.send_replace(Some(buses.to_vec()));
        }),
    )?;
    Ok((feed, receiver))
}

pub async fn handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<PassengerQuery>,
) -> Result<Response, ApiError> {
    let matcher = query.matcher(&state)?;
    Ok(ws.on_upgrade(|socket| handle_socket(socket, state, matcher)))
}

/// Pushes the annotated list on connect, on every store change and every time
/// the client reports a new position as `{"lat": .., "lng": ..}`. Only the
/// latest list is kept for a slow client.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, matcher: PassengerMatcher) {
    let (feed, mut receiver) = match latest_bus_lists(&state.store, matcher) {
        Ok(latest) => latest,
        Err(error) => {
            warn!(%error, "Could not subscribe passenger feed");
            return;
        }
    };

    loop {
        tokio::select! {
            changed = receiver.changed() => {
                if changed.is_err() {
                    break;
                }
                let Some(buses) = receiver.borrow_and_update().clone() else {
                    continue;
                };
                let payload = match serde_json::to_string(&buses) {
                    Ok(payload) => payload,
                    Err(error) => {
                        warn!(%error, "Could not serialize bus list");
                        continue;
                    }
                };
                if socket.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
            message = socket.recv() => match message {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ReferencePosition>(text.as_str()) {
                        Ok(position) => match GeoPoint::try_new(position.lat, position.lng) {
                            Ok(point) => feed.set_reference_position(Some(point)),
                            Err(error) => warn!(%error, "Ignoring invalid passenger position"),
                        },
                        Err(error) => warn!(%error, "Ignoring malformed socket message"),
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            }
        }
    }

    feed.unsubscribe();
    debug!("Passenger socket closed");
}
