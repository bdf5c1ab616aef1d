use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use transit_tracker::{
    geo::geo_point::GeoPoint,
    passenger::{
        annotated_bus::AnnotatedBus, passenger_matcher::PassengerMatcher,
        route_query::RouteQuery,
    },
    store::position_store::RealtimePositionStore,
};

use crate::{error::ApiError, state::AppState};

/// `?starting_point=..&destination=..[&lat=..&lng=..]`
#[derive(Debug, Deserialize)]
pub struct PassengerQuery {
    pub starting_point: String,
    pub destination: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl PassengerQuery {
    pub fn reference_position(&self) -> Result<Option<GeoPoint>, ApiError> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Ok(Some(GeoPoint::try_new(lat, lng)?)),
            (None, None) => Ok(None),
            _ => Err(ApiError::BadRequest(String::from(
                "lat and lng must be given together",
            ))),
        }
    }

    pub fn matcher(&self, state: &AppState) -> Result<PassengerMatcher, ApiError> {
        Ok(PassengerMatcher::from_config(
            RouteQuery::new(self.starting_point.as_str(), self.destination.as_str()),
            self.reference_position()?,
            &state.config,
        ))
    }
}

pub async fn buses_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PassengerQuery>,
) -> Result<Json<Vec<AnnotatedBus>>, ApiError> {
    let matcher = query.matcher(&state)?;
    let snapshot = state.store.snapshot()?;
    Ok(Json(matcher.on_snapshot(&snapshot)))
}
