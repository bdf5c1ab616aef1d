use std::sync::Arc;

use axum::{Json, extract::State};
use transit_tracker::store::{
    position_snapshot::PositionSnapshot, position_store::RealtimePositionStore,
};

use crate::{error::ApiError, state::AppState};

pub async fn list_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PositionSnapshot>, ApiError> {
    Ok(Json(state.store.snapshot()?))
}
