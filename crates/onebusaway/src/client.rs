use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use http::Method;
use http::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use transit::{
    ArrivalRecord, Coordinate, Error, HttpRequest, Result, StopRecord, TransitProvider,
    fetch_within, malformed,
};

use crate::envelope::{ArrivalsData, Envelope, StopList};

/// Puget Sound region deployment.
pub const DEFAULT_BASE_URL: &str = "https://api.pugetsound.onebusaway.org";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const UPSTREAM: &str = "OneBusAway";
const SUCCESS_CODE: u16 = 200;

/// OneBusAway client issuing requests through a host-provided [`HttpRequest`].
#[derive(Clone)]
pub struct OneBusAway<H>
where
    H: HttpRequest + ?Sized,
{
    http: Arc<H>,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl<H> OneBusAway<H>
where
    H: HttpRequest,
{
    pub fn new(http: Arc<H>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url, api_key: None, timeout: DEFAULT_TIMEOUT }
    }

    /// Append `key=<api_key>` to every request. Blank keys are ignored.
    #[must_use]
    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn stops_url(&self, origin: Coordinate, radius_meters: u32, max_count: usize) -> String {
        let url = format!(
            "{}/api/where/stops-for-location.json?lat={}&lon={}&radius={radius_meters}&maxCount={max_count}",
            self.base_url,
            origin.lat(),
            origin.lng()
        );
        self.with_key(url, '&')
    }

    fn arrivals_url(&self, stop_id: &str) -> String {
        let url = format!(
            "{}/api/where/arrivals-and-departures-for-stop/{}.json",
            self.base_url,
            urlencoding::encode(stop_id)
        );
        self.with_key(url, '?')
    }

    fn with_key(&self, url: String, separator: char) -> String {
        match &self.api_key {
            Some(key) => format!("{url}{separator}key={}", urlencoding::encode(key)),
            None => url,
        }
    }

    /// GET `url` and unwrap the OneBusAway envelope.
    ///
    /// Both the HTTP status and the envelope `code` must signal success; any
    /// other value fails the whole call.
    async fn get<T: DeserializeOwned>(&self, url: String, operation: &str) -> Result<T> {
        let request = http::Request::builder()
            .method(Method::GET)
            .uri(url)
            .header(ACCEPT, "application/json; charset=utf-8")
            .body(Bytes::new())
            .with_context(|| format!("building {operation} request"))?;

        let response = fetch_within(self.http.as_ref(), request, self.timeout, UPSTREAM).await?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                monotonic_counter.upstream_errors = 1,
                operation,
                status = status.as_u16(),
                "OneBusAway request failed"
            );
            return Err(Error::UpstreamUnavailable {
                status: Some(status.as_u16()),
                message: format!("OneBusAway API error: {status}"),
            });
        }

        let envelope: Envelope = serde_json::from_slice(response.body())
            .map_err(|err| malformed!("decoding {operation} response: {err}"))?;

        if envelope.code != SUCCESS_CODE {
            warn!(
                monotonic_counter.upstream_errors = 1,
                operation,
                code = envelope.code,
                "OneBusAway returned error code"
            );
            let detail = envelope.text.map(|text| format!(" ({text})")).unwrap_or_default();
            return Err(Error::UpstreamUnavailable {
                status: Some(envelope.code),
                message: format!("OneBusAway API returned error code: {}{detail}", envelope.code),
            });
        }

        debug!(operation, server_time = ?envelope.current_time, "OneBusAway response received");

        let data = envelope.data.ok_or_else(|| malformed!("{operation} response has no data"))?;
        serde_json::from_value(data).map_err(|err| malformed!("decoding {operation} data: {err}"))
    }
}

impl<H> TransitProvider for OneBusAway<H>
where
    H: HttpRequest,
{
    async fn stops_near(
        &self, origin: Coordinate, radius_meters: u32, max_count: usize,
    ) -> Result<Vec<StopRecord>> {
        debug!(origin = %origin, radius_meters, max_count, "querying stops for location");

        let url = self.stops_url(origin, radius_meters, max_count);
        let stops: StopList = self.get(url, "stops-for-location").await?;
        Ok(stops.list)
    }

    async fn arrivals_for_stop(&self, stop_id: &str) -> Result<Vec<ArrivalRecord>> {
        debug!(stop_id, "querying arrivals and departures");

        let url = self.arrivals_url(stop_id);
        let data: ArrivalsData = self.get(url, "arrivals-and-departures-for-stop").await?;

        if let Some(returned) = data.entry.stop_id.as_deref()
            && returned != stop_id
        {
            warn!(requested = stop_id, returned, "OneBusAway answered for a different stop");
        }

        Ok(data.entry.arrivals_and_departures)
    }
}
