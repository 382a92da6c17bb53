//! OneBusAway response envelopes.

use serde::Deserialize;
use serde_json::Value;
use transit::{ArrivalRecord, StopRecord};

/// The OneBusAway response wrapper. `code` is the API's own status and may
/// disagree with the HTTP status.
///
/// `data` stays undecoded until `code` has been checked; error replies carry
/// payloads of arbitrary shape.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub code: u16,
    #[serde(default)]
    pub current_time: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct StopList {
    pub list: Vec<StopRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ArrivalsData {
    pub entry: ArrivalsEntry,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalsEntry {
    #[serde(default)]
    pub stop_id: Option<String>,
    pub arrivals_and_departures: Vec<ArrivalRecord>,
}
