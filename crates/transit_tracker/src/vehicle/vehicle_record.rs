use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    error::TrackerError,
    geo::geo_point::GeoPoint,
    vehicle::{vehicle_id::VehicleId, vehicle_meta::VehicleMeta},
};

/// Current broadcast state of one driver, as stored under `buses/{vehicleId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    #[serde(flatten)]
    pub meta: VehicleMeta,
    pub position: GeoPoint,
    pub timestamp: Timestamp,
}

impl VehicleRecord {
    pub fn new(meta: VehicleMeta, position: GeoPoint, timestamp: Timestamp) -> Self {
        VehicleRecord {
            meta,
            position,
            timestamp,
        }
    }

    pub fn vehicle_id(&self) -> &VehicleId {
        &self.meta.vehicle_id
    }

    pub fn route_label(&self) -> &str {
        &self.meta.route_label
    }

    pub fn starting_point(&self) -> &str {
        &self.meta.starting_point
    }

    pub fn destination(&self) -> &str {
        &self.meta.destination
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        self.meta.validate()?;
        self.position.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> VehicleRecord {
        VehicleRecord::new(
            VehicleMeta::new(
                VehicleId::new("Bus 42").unwrap(),
                "Route 42",
                "Majestic",
                "Electronic City",
            )
            .with_city("Bengaluru"),
            GeoPoint::new(12.90, 77.58),
            "2024-05-01T08:30:00Z".parse().unwrap(),
        )
    }

    #[test]
    fn uses_the_store_wire_shape() {
        let json = serde_json::to_value(record()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "vehicleId": "Bus 42",
                "route": "Route 42",
                "startingPoint": "Majestic",
                "destination": "Electronic City",
                "city": "Bengaluru",
                "position": [12.90, 77.58],
                "timestamp": "2024-05-01T08:30:00Z",
            })
        );
    }

    #[test]
    fn rejects_records_with_missing_fields() {
        let missing_destination = serde_json::json!({
            "vehicleId": "Bus 42",
            "route": "Route 42",
            "startingPoint": "Majestic",
            "position": [12.90, 77.58],
            "timestamp": "2024-05-01T08:30:00Z",
        });
        assert!(serde_json::from_value::<VehicleRecord>(missing_destination).is_err());

        let mut blank = record();
        blank.meta.starting_point = String::from("  ");
        assert!(matches!(blank.validate(), Err(TrackerError::InvalidRecord(_))));

        let mut off_the_map = record();
        off_the_map.position = GeoPoint::new(120.0, 0.0);
        assert!(off_the_map.validate().is_err());
    }
}
