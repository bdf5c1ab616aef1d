use serde::{Deserialize, Serialize};

use crate::{error::TrackerError, vehicle::vehicle_id::VehicleId};

/// Route metadata a driver broadcasts alongside every position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleMeta {
    pub vehicle_id: VehicleId,
    #[serde(rename = "route")]
    pub route_label: String,
    pub starting_point: String,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl VehicleMeta {
    pub fn new(
        vehicle_id: VehicleId,
        route_label: impl Into<String>,
        starting_point: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        VehicleMeta {
            vehicle_id,
            route_label: route_label.into(),
            starting_point: starting_point.into(),
            destination: destination.into(),
            city: None,
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        for (field, value) in [
            ("route", &self.route_label),
            ("startingPoint", &self.starting_point),
            ("destination", &self.destination),
        ] {
            if value.trim().is_empty() {
                return Err(TrackerError::InvalidRecord(format!(
                    "{field} must not be empty for vehicle {}",
                    self.vehicle_id
                )));
            }
        }

        Ok(())
    }
}
