use jiff::Timestamp;

use crate::{
    geo::{distance::EARTH_RADIUS_KM, geo_point::GeoPoint},
    vehicle::{vehicle_id::VehicleId, vehicle_meta::VehicleMeta, vehicle_record::VehicleRecord},
};

pub fn vehicle_id(name: &str) -> VehicleId {
    VehicleId::new(name).unwrap()
}

pub fn create_vehicle_meta(name: &str, starting_point: &str, destination: &str) -> VehicleMeta {
    VehicleMeta::new(
        vehicle_id(name),
        format!("Route {name}"),
        starting_point,
        destination,
    )
}

pub fn create_vehicle_record(
    name: &str,
    starting_point: &str,
    destination: &str,
    (lat, lng): (f64, f64),
) -> VehicleRecord {
    VehicleRecord::new(
        create_vehicle_meta(name, starting_point, destination),
        GeoPoint::new(lat, lng),
        Timestamp::now(),
    )
}

/// A point `km` kilometers due north of `origin`, along its meridian.
pub fn north_of(origin: GeoPoint, km: f64) -> GeoPoint {
    GeoPoint::new(origin.lat + (km / EARTH_RADIUS_KM).to_degrees(), origin.lng)
}
