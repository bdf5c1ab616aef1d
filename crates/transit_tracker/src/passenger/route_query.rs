use serde::{Deserialize, Serialize};

/// The trip a passenger asked for. Never changes once submitted, a new trip
/// is a new query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteQuery {
    starting_point: String,
    destination: String,
}

impl RouteQuery {
    pub fn new(starting_point: impl Into<String>, destination: impl Into<String>) -> Self {
        RouteQuery {
            starting_point: starting_point.into(),
            destination: destination.into(),
        }
    }

    pub fn starting_point(&self) -> &str {
        &self.starting_point
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }
}
