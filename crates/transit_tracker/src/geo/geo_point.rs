use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// A WGS84 coordinate in degrees.
///
/// Serialized as a `[lat, lng]` pair, the shape positions have in the realtime
/// store.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        GeoPoint { lat, lng }
    }

    pub fn try_new(lat: f64, lng: f64) -> Result<Self, TrackerError> {
        let point = GeoPoint { lat, lng };
        point.validate()?;
        Ok(point)
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(TrackerError::InvalidRecord(format!(
                "latitude {} is out of range",
                self.lat
            )));
        }

        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(TrackerError::InvalidRecord(format!(
                "longitude {} is out of range",
                self.lng
            )));
        }

        Ok(())
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from([lat, lng]: [f64; 2]) -> Self {
        GeoPoint { lat, lng }
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(point: GeoPoint) -> Self {
        [point.lat, point.lng]
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lng): (f64, f64)) -> Self {
        GeoPoint { lat, lng }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_lat_lng_pair() {
        let point = GeoPoint::new(12.9, 77.58);
        assert_eq!(serde_json::to_string(&point).unwrap(), "[12.9,77.58]");

        let parsed: GeoPoint = serde_json::from_str("[-36.85,174.76]").unwrap();
        assert_eq!(parsed, GeoPoint::new(-36.85, 174.76));
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(GeoPoint::try_new(90.5, 0.0).is_err());
        assert!(GeoPoint::try_new(0.0, -180.1).is_err());
        assert!(GeoPoint::try_new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::try_new(-90.0, 180.0).is_ok());
    }
}
