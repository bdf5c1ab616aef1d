use std::sync::Arc;

use axum::{Router, routing::get};

use crate::{
    buses::{
        bus::{delete_handler, get_handler, put_handler},
        list::list_handler,
        ws,
    },
    state::AppState,
};

pub fn bus_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_handler))
        .route("/ws", get(ws::handler))
        .route(
            "/{vehicle_id}",
            get(get_handler).put(put_handler).delete(delete_handler),
        )
}
