use std::{collections::BTreeMap, sync::Arc};

use serde::Serialize;

use crate::vehicle::{vehicle_id::VehicleId, vehicle_record::VehicleRecord};

/// Immutable view of every record in the store at one point in time.
///
/// Cloning is cheap, all clones share the same map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PositionSnapshot {
    records: Arc<BTreeMap<VehicleId, VehicleRecord>>,
}

impl PositionSnapshot {
    pub fn new(records: BTreeMap<VehicleId, VehicleRecord>) -> Self {
        PositionSnapshot {
            records: Arc::new(records),
        }
    }

    /// Mutable access for the owning store. Copies the map only while older
    /// snapshots are still held by subscribers.
    pub(crate) fn make_mut(&mut self) -> &mut BTreeMap<VehicleId, VehicleRecord> {
        Arc::make_mut(&mut self.records)
    }

    pub fn get(&self, vehicle_id: &VehicleId) -> Option<&VehicleRecord> {
        self.records.get(vehicle_id)
    }

    pub fn contains(&self, vehicle_id: &VehicleId) -> bool {
        self.records.contains_key(vehicle_id)
    }

    /// Records in store iteration order, ascending vehicle id.
    pub fn records(&self) -> impl Iterator<Item = &VehicleRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<VehicleRecord> for PositionSnapshot {
    fn from_iter<I: IntoIterator<Item = VehicleRecord>>(iter: I) -> Self {
        PositionSnapshot::new(
            iter.into_iter()
                .map(|record| (record.vehicle_id().clone(), record))
                .collect(),
        )
    }
}
