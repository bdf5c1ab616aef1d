use jiff::SignedDuration;

use crate::geo::{distance::haversine_distance, geo_point::GeoPoint, kmh::Kmh};

/// Estimates arrival times from great-circle distance at a constant average
/// speed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EtaEstimator {
    speed: Kmh,
}

impl EtaEstimator {
    pub fn new(speed: Kmh) -> Self {
        EtaEstimator { speed }
    }

    pub fn speed(&self) -> Kmh {
        self.speed
    }

    pub fn eta_duration(&self, from: &GeoPoint, to: &GeoPoint) -> SignedDuration {
        haversine_distance(from, to) / self.speed
    }

    pub fn eta_minutes(&self, from: &GeoPoint, to: &GeoPoint) -> u32 {
        eta_minutes(from, to, self.speed)
    }
}

/// `round(distance / speed * 60)`, in whole minutes.
pub fn eta_minutes(from: &GeoPoint, to: &GeoPoint, speed: Kmh) -> u32 {
    let hours = haversine_distance(from, to).value() / speed.value();
    (hours * 60.0).round() as u32
}
