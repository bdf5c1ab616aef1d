use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Key of a vehicle in the realtime store, the driver's vehicle name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VehicleId(String);

impl VehicleId {
    pub fn new(value: impl Into<String>) -> Result<Self, TrackerError> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(TrackerError::InvalidRecord(String::from(
                "vehicle id must not be empty",
            )));
        }

        // Ids become store paths (`buses/{id}`).
        if trimmed.contains('/') {
            return Err(TrackerError::InvalidRecord(format!(
                "vehicle id '{trimmed}' must not contain '/'"
            )));
        }

        Ok(VehicleId(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VehicleId {
    type Error = TrackerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        VehicleId::new(value)
    }
}

impl From<VehicleId> for String {
    fn from(id: VehicleId) -> Self {
        id.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
