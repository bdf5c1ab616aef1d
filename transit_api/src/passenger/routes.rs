use std::sync::Arc;

use axum::{Router, routing::get};

use crate::{
    passenger::{buses::buses_handler, ws},
    state::AppState,
};

pub fn passenger_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/buses", get(buses_handler))
        .route("/ws", get(ws::handler))
}
