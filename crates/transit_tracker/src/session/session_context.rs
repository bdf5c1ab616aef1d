use std::sync::Arc;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    error::{SessionKind, TrackerError},
    passenger::route_query::RouteQuery,
    session::session_store::SessionStore,
    vehicle::{vehicle_id::VehicleId, vehicle_meta::VehicleMeta},
};

pub const DRIVER_SESSION_KEY: &str = "driverInfo";
pub const PASSENGER_SESSION_KEY: &str = "passengerRoute";

/// What a driver entered on the login form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverSession {
    pub vehicle_name: String,
    pub starting_point: String,
    pub destination: String,
    pub route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl DriverSession {
    pub fn vehicle_meta(&self) -> Result<VehicleMeta, TrackerError> {
        let meta = VehicleMeta {
            vehicle_id: VehicleId::new(self.vehicle_name.as_str())?,
            route_label: self.route.clone(),
            starting_point: self.starting_point.clone(),
            destination: self.destination.clone(),
            city: self.city.clone(),
        };
        meta.validate()?;
        Ok(meta)
    }
}

/// What a passenger entered on the route form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerSession {
    pub starting_point: String,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl PassengerSession {
    pub fn route_query(&self) -> RouteQuery {
        RouteQuery::new(self.starting_point.as_str(), self.destination.as_str())
    }
}

/// Carries form submissions from the entry screens to the tracking screens.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        SessionContext { store }
    }

    pub fn save_driver(&self, session: &DriverSession) -> Result<(), TrackerError> {
        self.save(DRIVER_SESSION_KEY, session)
    }

    /// Fails with [`TrackerError::MissingSessionState`] when the driver never
    /// logged in.
    pub fn load_driver(&self) -> Result<DriverSession, TrackerError> {
        self.load(DRIVER_SESSION_KEY, SessionKind::Driver)
    }

    pub fn clear_driver(&self) -> Result<(), TrackerError> {
        debug!("Clearing driver session");
        self.store.remove(DRIVER_SESSION_KEY)
    }

    pub fn save_passenger(&self, session: &PassengerSession) -> Result<(), TrackerError> {
        self.save(PASSENGER_SESSION_KEY, session)
    }

    pub fn load_passenger(&self) -> Result<PassengerSession, TrackerError> {
        self.load(PASSENGER_SESSION_KEY, SessionKind::Passenger)
    }

    pub fn clear_passenger(&self) -> Result<(), TrackerError> {
        debug!("Clearing passenger session");
        self.store.remove(PASSENGER_SESSION_KEY)
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), TrackerError> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json)
    }

    fn load<T: DeserializeOwned>(&self, key: &str, kind: SessionKind) -> Result<T, TrackerError> {
        let json = self
            .store
            .get(key)?
            .ok_or(TrackerError::MissingSessionState(kind))?;
        Ok(serde_json::from_str(&json)?)
    }
}
