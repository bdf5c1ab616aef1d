use crate::{
    error::TrackerError,
    store::{position_snapshot::PositionSnapshot, subscription::Subscription},
    vehicle::{vehicle_id::VehicleId, vehicle_record::VehicleRecord},
};

pub type SnapshotCallback = Box<dyn FnMut(&PositionSnapshot) + Send + 'static>;

/// Shared keyed map from vehicle id to its latest record, with push-based
/// change notification.
///
/// Every mutation notifies all subscribers with the complete snapshot taken
/// right after it. Writes to distinct keys are independent, writes to the same
/// key are last-write-wins in call order.
pub trait RealtimePositionStore: Send + Sync {
    /// Upserts `record` under `vehicle_id`.
    fn publish(&self, vehicle_id: &VehicleId, record: VehicleRecord) -> Result<(), TrackerError>;

    /// Deletes the record under `vehicle_id`. Absent ids are not an error.
    fn remove(&self, vehicle_id: &VehicleId) -> Result<(), TrackerError>;

    /// Registers `callback`. It is called with the current snapshot right away
    /// and again after every publish or remove.
    fn subscribe(&self, callback: SnapshotCallback) -> Result<Subscription, TrackerError>;

    fn snapshot(&self) -> Result<PositionSnapshot, TrackerError>;
}
