mod buses;
mod config;
mod error;
mod passenger;
mod state;

use std::sync::Arc;

use axum::http::Method;
use axum::{Router, serve};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{Level, info};

use crate::buses::routes::bus_routes;
use crate::config::ApiConfig;
use crate::passenger::routes::passenger_routes;
use crate::state::AppState;

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::from_filename("./.env.local").ok();
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = ApiConfig::from_env()?;
    info!(
        average_speed_kmh = config.tracker.average_speed.value(),
        stale_after = ?config.tracker.stale_after,
        "Loaded tracker configuration"
    );

    let state = Arc::new(AppState::new(config.tracker));

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    info!(address = %config.bind_address, "Transit API listening");

    serve(listener, app(state)).await?;

    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::PUT, Method::DELETE])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/buses", bus_routes())
        .nest("/passenger", passenger_routes())
        .layer(ServiceBuilder::new().layer(cors_layer))
        .with_state(state)
}
