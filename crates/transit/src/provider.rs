//! # Provider
//!
//! Provider defines external data interfaces for the crate.

use std::time::Duration;

use bytes::Bytes;
use http::{Request, Response};
use tracing::warn;

use crate::geo::Coordinate;
use crate::model::{ArrivalRecord, Place, StopRecord};
use crate::{Error, Result};

/// The `HttpRequest` trait defines the behavior for fetching data from a source.
pub trait HttpRequest: Send + Sync {
    /// Make outbound HTTP request.
    fn fetch(
        &self, request: Request<Bytes>,
    ) -> impl Future<Output = anyhow::Result<Response<Bytes>>> + Send;
}

/// The `TransitProvider` trait defines the upstream transit data source used
/// by stop discovery and arrival aggregation.
pub trait TransitProvider: Send + Sync {
    /// Stops within `radius_meters` of `origin`, at most `max_count` of them.
    ///
    /// The provider's radius filter is approximate and its ordering is not
    /// authoritative.
    fn stops_near(
        &self, origin: Coordinate, radius_meters: u32, max_count: usize,
    ) -> impl Future<Output = Result<Vec<StopRecord>>> + Send;

    /// All scheduled and predicted visits for `stop_id`, in upstream order.
    fn arrivals_for_stop(
        &self, stop_id: &str,
    ) -> impl Future<Output = Result<Vec<ArrivalRecord>>> + Send;
}

/// The `GeocodingProvider` trait converts between free text and coordinates.
pub trait GeocodingProvider: Send + Sync {
    /// Ranked candidates for `query`, at most `limit` of them.
    fn geocode(&self, query: &str, limit: usize)
    -> impl Future<Output = Result<Vec<Place>>> + Send;

    /// The best place name for `coordinate`, if the provider knows one.
    fn reverse_geocode(
        &self, coordinate: Coordinate,
    ) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// Issue `request` through `http`, failing with [`Error::UpstreamTimeout`]
/// once `timeout` elapses.
///
/// Transport failures become [`Error::UpstreamUnavailable`] without a status;
/// the response status is left for the caller to judge.
///
/// # Errors
///
/// Returns [`Error::UpstreamTimeout`] or [`Error::UpstreamUnavailable`].
pub async fn fetch_within(
    http: &impl HttpRequest, request: Request<Bytes>, timeout: Duration, upstream: &str,
) -> Result<Response<Bytes>> {
    match tokio::time::timeout(timeout, http.fetch(request)).await {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(err)) => {
            warn!(monotonic_counter.upstream_errors = 1, upstream, error = %err, "request failed");
            Err(Error::UpstreamUnavailable {
                status: None,
                message: format!("{upstream} request failed: {err}"),
            })
        }
        Err(_elapsed) => {
            warn!(
                monotonic_counter.upstream_timeouts = 1,
                upstream,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                "request timed out"
            );
            Err(Error::UpstreamTimeout(format!(
                "{upstream} did not respond within {}ms",
                timeout.as_millis()
            )))
        }
    }
}
