#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use transit_tracker::{
    geo::{distance::EARTH_RADIUS_KM, geo_point::GeoPoint},
    passenger::{annotated_bus::AnnotatedBus, passenger_feed::BusListCallback},
    vehicle::{vehicle_id::VehicleId, vehicle_meta::VehicleMeta},
};

pub const PASSENGER: GeoPoint = GeoPoint {
    lat: 12.90,
    lng: 77.58,
};

pub fn create_vehicle_meta(name: &str, starting_point: &str, destination: &str) -> VehicleMeta {
    VehicleMeta::new(
        VehicleId::new(name).unwrap(),
        format!("Route {name}"),
        starting_point,
        destination,
    )
}

pub fn north_of(origin: GeoPoint, km: f64) -> GeoPoint {
    GeoPoint::new(origin.lat + (km / EARTH_RADIUS_KM).to_degrees(), origin.lng)
}

pub type DisplayedLists = Arc<Mutex<Vec<Vec<AnnotatedBus>>>>;

/// A display callback that keeps every list it is shown.
pub fn recording_display() -> (DisplayedLists, BusListCallback) {
    let lists: DisplayedLists = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lists);
    (
        lists,
        Box::new(move |buses: &[AnnotatedBus]| sink.lock().push(buses.to_vec())),
    )
}

pub fn etas(buses: &[AnnotatedBus]) -> Vec<(String, Option<u32>)> {
    buses
        .iter()
        .map(|bus| {
            (
                bus.record.vehicle_id().to_string(),
                bus.estimated_arrival_minutes,
            )
        })
        .collect()
}
