//! Provider-independent geocoding operations.

use tracing::{info, warn};
use transit::{Coordinate, Error, GeocodingProvider, Place, Result, invalid_input};

/// Returned by [`describe_location`] when the provider has no name for a
/// coordinate.
pub const UNKNOWN_LOCATION: &str = "Unknown location";

/// Ranked candidates for free-text `query`, at most `limit` of them.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for a blank query or a zero limit, and
/// propagates provider failures.
pub async fn geocode(
    provider: &impl GeocodingProvider, query: &str, limit: usize,
) -> Result<Vec<Place>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(invalid_input!("query must not be blank"));
    }
    if limit == 0 {
        return Err(invalid_input!("limit must be at least 1"));
    }

    let places = provider
        .geocode(query, limit)
        .await
        .inspect_err(|err| warn!(query, error = %err, "geocoding failed"))?;

    info!(monotonic_counter.geocode_lookups = 1, query, returned = places.len(), "geocoded query");

    Ok(places)
}

/// The coordinate of the best candidate for `address`.
///
/// # Errors
///
/// Returns [`Error::Geocoding`] when the provider finds nothing.
pub async fn resolve_address(
    provider: &impl GeocodingProvider, address: &str,
) -> Result<Coordinate> {
    let places = geocode(provider, address, 1).await?;
    places
        .into_iter()
        .next()
        .map(|place| place.coordinate)
        .ok_or_else(|| Error::Geocoding("no results found for the given address".to_string()))
}

/// A human-readable name for `coordinate`, or [`UNKNOWN_LOCATION`].
///
/// # Errors
///
/// Propagates provider failures. An empty answer is not a failure.
pub async fn describe_location(
    provider: &impl GeocodingProvider, coordinate: Coordinate,
) -> Result<String> {
    let name = provider
        .reverse_geocode(coordinate)
        .await
        .inspect_err(|err| warn!(%coordinate, error = %err, "reverse lookup failed"))?;
    Ok(name.unwrap_or_else(|| UNKNOWN_LOCATION.to_string()))
}
