use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Driver,
    Passenger,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Driver => write!(f, "driver"),
            SessionKind::Passenger => write!(f, "passenger"),
        }
    }
}

/// Errors surfaced by the tracker. None of them is fatal to the process, every
/// one of them can be recovered from at the session level.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),

    #[error("No {0} session state, the route form must be submitted first")]
    MissingSessionState(SessionKind),

    #[error("Position store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid vehicle record: {0}")]
    InvalidRecord(String),

    #[error("Average speed must be a positive number of km/h, got {0}")]
    InvalidSpeed(f64),

    #[error("Session storage failed: {0}")]
    SessionStorage(String),
}

impl From<serde_json::Error> for TrackerError {
    fn from(error: serde_json::Error) -> Self {
        TrackerError::SessionStorage(error.to_string())
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(error: std::io::Error) -> Self {
        TrackerError::SessionStorage(error.to_string())
    }
}
