//! # Transit
//!
//! Nearest-stop discovery and live arrival aggregation over an abstract
//! transit data provider.
//!
//! Every operation is a stateless transformation of a fresh provider response:
//! nothing is cached between calls and no fallback data is ever substituted
//! for a failed lookup.

mod error;

pub mod arrivals;
pub mod geo;
pub mod model;
pub mod provider;
pub mod stops;
pub mod time;

pub use crate::arrivals::{
    ArrivalQuery, DEFAULT_WINDOW_MS, get_arrivals, query_arrivals, restrict_to_window,
};
pub use crate::error::*;
pub use crate::geo::{Coordinate, haversine_distance};
pub use crate::model::{Arrival, ArrivalRecord, ArrivalStatus, Place, StopRecord, TransitStop};
pub use crate::provider::{GeocodingProvider, HttpRequest, TransitProvider, fetch_within};
pub use crate::stops::{DEFAULT_STOP_LIMIT, find_nearest_stops};
pub use crate::time::EpochMillis;
