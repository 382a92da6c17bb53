#![allow(missing_docs)]

use std::sync::{Arc, Mutex};

use transit::{
    ArrivalRecord, Coordinate, EpochMillis, Error, Result, StopRecord, TransitProvider,
};

/// A recorded `stops_near` call.
#[derive(Debug, Clone, PartialEq)]
pub struct StopsCall {
    pub origin: Coordinate,
    pub radius_meters: u32,
    pub max_count: usize,
}

#[derive(Clone, Default)]
pub struct MockProvider {
    stops: Vec<StopRecord>,
    arrivals: Vec<ArrivalRecord>,
    failure: Option<Error>,
    stop_calls: Arc<Mutex<Vec<StopsCall>>>,
    arrival_calls: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    #[allow(unused)]
    #[must_use]
    pub fn with_stops(stops: Vec<StopRecord>) -> Self {
        Self { stops, ..Self::default() }
    }

    #[allow(unused)]
    #[must_use]
    pub fn with_arrivals(arrivals: Vec<ArrivalRecord>) -> Self {
        Self { arrivals, ..Self::default() }
    }

    #[allow(unused)]
    #[must_use]
    pub fn failing(error: Error) -> Self {
        Self { failure: Some(error), ..Self::default() }
    }

    #[allow(unused, clippy::missing_panics_doc)]
    #[must_use]
    pub fn stop_calls(&self) -> Vec<StopsCall> {
        self.stop_calls.lock().expect("lock").clone()
    }

    #[allow(unused, clippy::missing_panics_doc)]
    #[must_use]
    pub fn arrival_calls(&self) -> Vec<String> {
        self.arrival_calls.lock().expect("lock").clone()
    }
}

impl TransitProvider for MockProvider {
    async fn stops_near(
        &self, origin: Coordinate, radius_meters: u32, max_count: usize,
    ) -> Result<Vec<StopRecord>> {
        self.stop_calls.lock().expect("lock").push(StopsCall { origin, radius_meters, max_count });
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(self.stops.iter().take(max_count).cloned().collect())
    }

    async fn arrivals_for_stop(&self, stop_id: &str) -> Result<Vec<ArrivalRecord>> {
        self.arrival_calls.lock().expect("lock").push(stop_id.to_string());
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(self.arrivals.clone())
    }
}

#[allow(unused)]
#[must_use]
pub fn stop(id: &str, lat: f64, lon: f64) -> StopRecord {
    StopRecord {
        id: id.to_string(),
        lat,
        lon,
        name: format!("Stop {id}"),
        code: Some(id.trim_start_matches("1_").to_string()),
        direction: None,
    }
}

#[allow(unused)]
#[must_use]
pub fn arrival(
    route: &str, predicted: Option<EpochMillis>, scheduled: EpochMillis,
) -> ArrivalRecord {
    ArrivalRecord {
        route_id: format!("1_{route}"),
        route_short_name: route.to_string(),
        route_long_name: format!("Route {route}"),
        trip_headsign: "Downtown Seattle".to_string(),
        predicted_arrival_time: predicted,
        scheduled_arrival_time: scheduled,
        arrival_enabled: true,
        departure_enabled: true,
    }
}
