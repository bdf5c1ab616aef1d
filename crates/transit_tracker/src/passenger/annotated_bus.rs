use serde::Serialize;

use crate::vehicle::vehicle_record::VehicleRecord;

/// A matching bus as shown to a passenger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedBus {
    #[serde(flatten)]
    pub record: VehicleRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_arrival_minutes: Option<u32>,
    /// `HH:MM` wall clock time of the estimated arrival.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_arrival_clock_time: Option<String>,
}
