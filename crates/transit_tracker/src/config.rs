use anyhow::Context;
use jiff::SignedDuration;

use crate::geo::{eta::EtaEstimator, kmh::Kmh};

pub const AVERAGE_SPEED_ENV_VAR: &str = "TRANSIT_AVERAGE_SPEED_KMH";
pub const STALE_AFTER_ENV_VAR: &str = "TRANSIT_STALE_AFTER_SECS";

/// Tuning shared by every passenger view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackerConfig {
    pub average_speed: Kmh,
    /// Records older than this are hidden from passengers. `None` shows
    /// everything the store holds.
    pub stale_after: Option<SignedDuration>,
}

impl TrackerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let average_speed = match lookup(AVERAGE_SPEED_ENV_VAR) {
            Some(value) => {
                let speed = value
                    .trim()
                    .parse::<f64>()
                    .with_context(|| format!("{AVERAGE_SPEED_ENV_VAR} must be a number"))?;
                Kmh::try_new(speed)?
            }
            None => Kmh::DEFAULT_AVERAGE,
        };

        let stale_after = match lookup(STALE_AFTER_ENV_VAR) {
            Some(value) => {
                let secs = value.trim().parse::<u32>().with_context(|| {
                    format!("{STALE_AFTER_ENV_VAR} must be a whole number of seconds")
                })?;
                // 0 disables the filter
                (secs > 0).then(|| SignedDuration::from_secs(i64::from(secs)))
            }
            None => None,
        };

        Ok(TrackerConfig {
            average_speed,
            stale_after,
        })
    }

    pub fn eta_estimator(&self) -> EtaEstimator {
        EtaEstimator::new(self.average_speed)
    }
}
