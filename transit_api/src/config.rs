use std::net::SocketAddr;

use anyhow::Context;
use transit_tracker::config::TrackerConfig;

pub const BIND_ADDRESS_ENV_VAR: &str = "TRANSIT_BIND_ADDRESS";
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";

pub struct ApiConfig {
    pub bind_address: SocketAddr,
    pub tracker: TrackerConfig,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_address = std::env::var(BIND_ADDRESS_ENV_VAR)
            .unwrap_or_else(|_| String::from(DEFAULT_BIND_ADDRESS));
        let bind_address = bind_address
            .parse()
            .with_context(|| format!("{BIND_ADDRESS_ENV_VAR} is not a socket address: {bind_address}"))?;

        Ok(ApiConfig {
            bind_address,
            tracker: TrackerConfig::from_env()?,
        })
    }
}
