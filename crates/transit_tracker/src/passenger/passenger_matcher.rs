use jiff::{SignedDuration, Zoned};
use tracing::{trace, warn};

use crate::{
    config::TrackerConfig,
    geo::{eta::EtaEstimator, geo_point::GeoPoint},
    passenger::{annotated_bus::AnnotatedBus, route_query::RouteQuery},
    store::position_snapshot::PositionSnapshot,
    vehicle::vehicle_record::VehicleRecord,
};

/// Turns store snapshots into the list of buses a passenger cares about.
///
/// A bus matches when the query's starting point appears in the bus's starting
/// point, or the query's destination appears in the bus's destination, ignoring
/// case. When the passenger position is known every match carries an ETA.
#[derive(Debug, Clone)]
pub struct PassengerMatcher {
    query: RouteQuery,
    starting_point_needle: String,
    destination_needle: String,
    reference_position: Option<GeoPoint>,
    estimator: EtaEstimator,
    stale_after: Option<SignedDuration>,
}

impl PassengerMatcher {
    pub fn new(query: RouteQuery, reference_position: Option<GeoPoint>) -> Self {
        PassengerMatcher {
            starting_point_needle: query.starting_point().to_lowercase(),
            destination_needle: query.destination().to_lowercase(),
            query,
            reference_position,
            estimator: EtaEstimator::default(),
            stale_after: None,
        }
    }

    pub fn from_config(
        query: RouteQuery,
        reference_position: Option<GeoPoint>,
        config: &TrackerConfig,
    ) -> Self {
        Self::new(query, reference_position)
            .with_estimator(config.eta_estimator())
            .with_stale_after(config.stale_after)
    }

    pub fn with_estimator(mut self, estimator: EtaEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_stale_after(mut self, stale_after: Option<SignedDuration>) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn query(&self) -> &RouteQuery {
        &self.query
    }

    pub fn reference_position(&self) -> Option<GeoPoint> {
        self.reference_position
    }

    pub fn set_reference_position(&mut self, position: Option<GeoPoint>) {
        self.reference_position = position;
    }

    pub fn matches(&self, record: &VehicleRecord) -> bool {
        record
            .starting_point()
            .to_lowercase()
            .contains(&self.starting_point_needle)
            || record
                .destination()
                .to_lowercase()
                .contains(&self.destination_needle)
    }

    pub fn on_snapshot(&self, snapshot: &PositionSnapshot) -> Vec<AnnotatedBus> {
        self.on_snapshot_at(snapshot, &Zoned::now())
    }

    /// Like [`PassengerMatcher::on_snapshot`], with `now` used for staleness
    /// and for the arrival clock time.
    pub fn on_snapshot_at(&self, snapshot: &PositionSnapshot, now: &Zoned) -> Vec<AnnotatedBus> {
        let buses: Vec<AnnotatedBus> = snapshot
            .records()
            .filter(|record| !self.is_stale(record, now))
            .filter(|record| self.matches(record))
            .map(|record| self.annotate(record, now))
            .collect();

        trace!(
            total = snapshot.len(),
            matching = buses.len(),
            "Matched snapshot against passenger route"
        );

        buses
    }

    fn is_stale(&self, record: &VehicleRecord, now: &Zoned) -> bool {
        self.stale_after
            .is_some_and(|stale_after| now.timestamp().duration_since(record.timestamp) > stale_after)
    }

    fn annotate(&self, record: &VehicleRecord, now: &Zoned) -> AnnotatedBus {
        let Some(reference) = self.reference_position else {
            return AnnotatedBus {
                record: record.clone(),
                estimated_arrival_minutes: None,
                estimated_arrival_clock_time: None,
            };
        };

        let minutes = self.estimator.eta_minutes(&record.position, &reference);
        let clock_time = match now.checked_add(SignedDuration::from_mins(i64::from(minutes))) {
            Ok(arrival) => Some(arrival.strftime("%H:%M").to_string()),
            Err(error) => {
                warn!(%error, vehicle_id = %record.vehicle_id(), "Arrival time out of range");
                None
            }
        };

        AnnotatedBus {
            record: record.clone(),
            estimated_arrival_minutes: Some(minutes),
            estimated_arrival_clock_time: clock_time,
        }
    }
}
