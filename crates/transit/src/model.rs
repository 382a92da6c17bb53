//! # Model
//!
//! Records returned by upstream providers and the normalized values handed to
//! callers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::time::{EpochMillis, minutes_until};
use crate::{Result, malformed};

/// A stop as reported by the upstream transit provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopRecord {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
}

/// A scheduled or predicted visit as reported by the upstream provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalRecord {
    pub route_id: String,
    pub route_short_name: String,
    pub route_long_name: String,
    pub trip_headsign: String,
    #[serde(default)]
    pub predicted_arrival_time: Option<EpochMillis>,
    pub scheduled_arrival_time: EpochMillis,
    pub arrival_enabled: bool,
    pub departure_enabled: bool,
}

/// A boarding location near a query origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitStop {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub coordinates: Coordinate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,

    /// Meters from the query origin. Only meaningful for the query that
    /// produced it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl TryFrom<StopRecord> for TransitStop {
    type Error = crate::Error;

    fn try_from(record: StopRecord) -> Result<Self> {
        let coordinates = Coordinate::new(record.lat, record.lon)
            .map_err(|err| malformed!("stop {} has invalid coordinates: {err}", record.id))?;

        Ok(Self {
            id: record.id,
            name: record.name,
            code: record.code,
            coordinates,
            direction: record.direction,
            distance: None,
        })
    }
}

/// Where an arrival time came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrivalStatus {
    /// Timetable value only.
    #[default]
    Scheduled,

    /// Real-time tracked estimate.
    Predicted,

    /// Running late. Not derived by normalization; kept for wire
    /// compatibility with consumers that set it.
    Delayed,
}

impl fmt::Display for ArrivalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::Predicted => write!(f, "predicted"),
            Self::Delayed => write!(f, "delayed"),
        }
    }
}

/// An upcoming vehicle visit to a stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrival {
    pub route_id: String,
    pub route_short_name: String,
    pub route_long_name: String,
    pub trip_headsign: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_arrival_time: Option<EpochMillis>,
    pub scheduled_arrival_time: EpochMillis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes_until_arrival: Option<i64>,
    pub status: ArrivalStatus,
}

impl Arrival {
    /// Normalize an upstream record relative to `now`.
    ///
    /// A predicted time of `0` is the upstream's "no prediction" marker and is
    /// treated as absent.
    #[must_use]
    pub fn from_record(record: ArrivalRecord, now: EpochMillis) -> Self {
        let predicted = record.predicted_arrival_time.filter(|time| *time > 0);
        let effective = predicted.unwrap_or(record.scheduled_arrival_time);
        let status =
            if predicted.is_some() { ArrivalStatus::Predicted } else { ArrivalStatus::Scheduled };

        Self {
            route_id: record.route_id,
            route_short_name: record.route_short_name,
            route_long_name: record.route_long_name,
            trip_headsign: record.trip_headsign,
            predicted_arrival_time: predicted,
            scheduled_arrival_time: record.scheduled_arrival_time,
            minutes_until_arrival: Some(minutes_until(effective, now)),
            status,
        }
    }

    /// The predicted time when present, otherwise the scheduled time.
    #[must_use]
    pub fn effective_time(&self) -> EpochMillis {
        self.predicted_arrival_time.unwrap_or(self.scheduled_arrival_time)
    }
}

/// A geocoding candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub label: String,
    pub coordinate: Coordinate,
}
