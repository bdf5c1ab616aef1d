use std::future::Future;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{error::TrackerError, geo::geo_point::GeoPoint};

/// One location reading from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub lat: f64,
    pub lng: f64,
    /// Radius of the 95% confidence circle, in meters.
    pub accuracy: f64,
    pub timestamp: Timestamp,
}

impl PositionFix {
    pub fn new(point: GeoPoint, accuracy: f64) -> Self {
        PositionFix {
            lat: point.lat,
            lng: point.lng,
            accuracy,
            timestamp: Timestamp::now(),
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(u64);

impl WatchId {
    pub fn new(value: u64) -> Self {
        WatchId(value)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

pub type PositionCallback = Box<dyn FnMut(PositionFix) + Send + 'static>;
pub type PositionErrorCallback = Box<dyn FnMut(TrackerError) + Send + 'static>;

/// Capability to locate the device.
///
/// `current_position` resolves exactly once. `watch_position` calls `on_update`
/// for every reading the platform produces until the watch is cleared; how
/// often that happens is up to the platform. Both fail with
/// [`TrackerError::PositionUnavailable`] when the platform cannot locate the
/// device or the user denied access.
pub trait GeoPositionSource: Send + Sync + 'static {
    fn current_position(&self) -> impl Future<Output = Result<PositionFix, TrackerError>> + Send;

    fn watch_position(
        &self,
        on_update: PositionCallback,
        on_error: PositionErrorCallback,
    ) -> Result<WatchId, TrackerError>;

    fn clear_watch(&self, watch_id: WatchId);
}
