use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use transit_tracker::{
    store::position_store::RealtimePositionStore,
    vehicle::{vehicle_id::VehicleId, vehicle_record::VehicleRecord},
};

use crate::{error::ApiError, state::AppState};

#[derive(Deserialize)]
pub struct BusPath {
    pub vehicle_id: String,
}

impl BusPath {
    fn vehicle_id(&self) -> Result<VehicleId, ApiError> {
        Ok(VehicleId::new(self.vehicle_id.as_str())?)
    }
}

pub async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<BusPath>,
) -> Result<Json<VehicleRecord>, ApiError> {
    let vehicle_id = path.vehicle_id()?;
    let snapshot = state.store.snapshot()?;

    snapshot
        .get(&vehicle_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Vehicle {vehicle_id} is not broadcasting")))
}

/// Upserts the vehicle's record. The body's `vehicleId` must match the path.
pub async fn put_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<BusPath>,
    Json(record): Json<VehicleRecord>,
) -> Result<StatusCode, ApiError> {
    let vehicle_id = path.vehicle_id()?;
    state.store.publish(&vehicle_id, record)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<BusPath>,
) -> Result<StatusCode, ApiError> {
    let vehicle_id = path.vehicle_id()?;
    state.store.remove(&vehicle_id)?;
    Ok(StatusCode::NO_CONTENT)
}
