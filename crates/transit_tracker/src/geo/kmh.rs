use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// A strictly positive speed in km/h.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Kmh(f64);

impl Kmh {
    /// Average bus speed assumed when nothing else is configured.
    pub const DEFAULT_AVERAGE: Kmh = Kmh(30.0);

    pub fn try_new(value: f64) -> Result<Self, TrackerError> {
        if value.is_finite() && value > 0.0 {
            Ok(Kmh(value))
        } else {
            Err(TrackerError::InvalidSpeed(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Kmh {
    fn default() -> Self {
        Kmh::DEFAULT_AVERAGE
    }
}

impl TryFrom<f64> for Kmh {
    type Error = TrackerError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Kmh::try_new(value)
    }
}

impl From<Kmh> for f64 {
    fn from(speed: Kmh) -> Self {
        speed.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_speed() {
        assert_eq!(Kmh::try_new(0.0), Err(TrackerError::InvalidSpeed(0.0)));
        assert_eq!(Kmh::try_new(-5.0), Err(TrackerError::InvalidSpeed(-5.0)));
        assert!(Kmh::try_new(f64::INFINITY).is_err());
        assert_eq!(Kmh::try_new(42.0).unwrap().value(), 42.0);
    }

    #[test]
    fn deserialization_is_validated() {
        assert!(serde_json::from_str::<Kmh>("0").is_err());
        assert_eq!(serde_json::from_str::<Kmh>("25").unwrap().value(), 25.0);
    }
}
