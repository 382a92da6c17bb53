//! # Stop Finder
//!
//! Nearest-stop discovery around a coordinate.
//!
//! The provider's search radius is only a coarse filter, so every candidate is
//! re-ranked by its haversine distance to the origin before truncation.

use tracing::{info, warn};

use crate::geo::{Coordinate, haversine_distance};
use crate::model::{StopRecord, TransitStop};
use crate::provider::TransitProvider;
use crate::{Result, invalid_input};

/// Radius passed to the provider's stop search, in meters.
pub const SEARCH_RADIUS_METERS: u32 = 500;

/// Number of candidates requested from the provider before local ranking.
pub const OVER_FETCH_COUNT: usize = 50;

/// Number of stops returned when the caller does not choose.
pub const DEFAULT_STOP_LIMIT: usize = 3;

/// The `limit` stops nearest to `origin`, ascending by distance.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidInput`] when `limit` is zero, and propagates
/// provider failures unchanged. No fallback list is ever substituted.
pub async fn find_nearest_stops(
    provider: &impl TransitProvider, origin: Coordinate, limit: usize,
) -> Result<Vec<TransitStop>> {
    if limit == 0 {
        return Err(invalid_input!("limit must be at least 1"));
    }

    let max_count = OVER_FETCH_COUNT.max(limit);
    let records = provider
        .stops_near(origin, SEARCH_RADIUS_METERS, max_count)
        .await
        .inspect_err(|err| warn!(origin = %origin, error = %err, "stop search failed"))?;

    let candidates = records.len();
    let stops = rank_stops(origin, records, limit)?;

    info!(
        monotonic_counter.stop_searches = 1,
        origin = %origin,
        candidates,
        returned = stops.len(),
        "ranked nearby stops"
    );

    Ok(stops)
}

/// Rank raw provider stops by distance from `origin` and keep the first
/// `limit`.
///
/// Ties keep the provider's order. Any ordering or distance the provider
/// reported is ignored.
///
/// # Errors
///
/// Returns [`crate::Error::MalformedResponse`] when a record carries
/// coordinates outside the WGS84 range.
pub fn rank_stops(
    origin: Coordinate, records: Vec<StopRecord>, limit: usize,
) -> Result<Vec<TransitStop>> {
    let mut ranked = records
        .into_iter()
        .map(|record| {
            let stop = TransitStop::try_from(record)?;
            let distance = haversine_distance(&origin, &stop.coordinates);
            Ok((distance, stop))
        })
        .collect::<Result<Vec<_>>>()?;

    // stable
    ranked.sort_by(|(a, _), (b, _)| a.total_cmp(b));

    Ok(ranked
        .into_iter()
        .take(limit)
        .map(|(distance, stop)| TransitStop { distance: Some(distance), ..stop })
        .collect())
}
