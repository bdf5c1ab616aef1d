use std::sync::Arc;

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use tokio::sync::watch;
use tracing::{debug, warn};
use transit_tracker::{
    error::TrackerError,
    store::{
        position_snapshot::PositionSnapshot, position_store::RealtimePositionStore,
        subscription::Subscription,
    },
};

use crate::state::AppState;

/// Subscribes to `store`, keeping only the most recent snapshot for the reader.
fn latest_snapshots(
    store: &dyn RealtimePositionStore,
) -> Result<(Subscription, watch::Receiver<Option<PositionSnapshot>>), TrackerError> {
    let (sender, receiver) = watch::channel(None);
    let subscription = store.subscribe(Box::new(move |snapshot: &PositionSnapshot| {
        sender.send_replace(Some(snapshot.clone()));
    }))?;
    Ok((subscription, receiver))
}

pub async fn handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Pushes the full collection on connect and after every change. A slow
/// client skips intermediate snapshots and only sees the latest one.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let (subscription, mut receiver) = match latest_snapshots(&state.store) {
        Ok(latest) => latest,
        Err(error) => {
            warn!(%error, "Could not subscribe socket to position store");
            return;
        }
    };

    loop {
        tokio::select! {
            changed = receiver.changed() => {
                if changed.is_err() {
                    break;
                }
                let Some(snapshot) = receiver.borrow_and_update().clone() else {
                    continue;
                };
                let payload = match serde_json::to_string(&snapshot) {
                    Ok(payload) => payload,
                    Err(error) => {
                        warn!(%error, "Could not serialize snapshot");
                        continue;
                    }
                };
                if socket.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
            message = socket.recv() => match message {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            }
        }
    }

    subscription.unsubscribe();
    debug!("Bus socket closed");
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use transit_tracker::{
        geo::geo_point::GeoPoint,
        store::in_memory_store::InMemoryPositionStore,
        vehicle::{vehicle_id::VehicleId, vehicle_meta::VehicleMeta, vehicle_record::VehicleRecord},
    };

    use super::*;

    #[test]
    fn unread_changes_collapse_to_latest_snapshot() {
        let store = InMemoryPositionStore::new();
        let (_subscription, mut receiver) = latest_snapshots(&store).unwrap();

        for index in 0..50 {
            let vehicle_id = VehicleId::new(format!("bus-{index:02}")).unwrap();
            let meta = VehicleMeta::new(vehicle_id.clone(), "42", "Main", "Oak");
            let record = VehicleRecord::new(meta, GeoPoint::new(12.9, 77.58), Timestamp::now());
            store.publish(&vehicle_id, record).unwrap();
        }

        assert!(receiver.has_changed().unwrap());
        let latest = receiver.borrow_and_update().clone().unwrap();
        assert_eq!(latest.len(), 50);
        assert!(!receiver.has_changed().unwrap());
    }
}
