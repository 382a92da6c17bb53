use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use http::Method;
use http::header::ACCEPT;
use serde::Deserialize;
use tracing::{debug, warn};
use transit::{
    Coordinate, Error, GeocodingProvider, HttpRequest, Place, Result, fetch_within, malformed,
};

pub const DEFAULT_BASE_URL: &str = "https://api.mapbox.com";

/// Seattle city center, as `lng,lat`.
pub const DEFAULT_PROXIMITY: &str = "-122.3321,47.6062";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const UPSTREAM: &str = "Mapbox";
const PLACES_PATH: &str = "geocoding/v5/mapbox.places";

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    place_name: String,
    #[serde(default)]
    center: Option<Vec<f64>>,
}

impl TryFrom<Feature> for Place {
    type Error = Error;

    fn try_from(feature: Feature) -> Result<Self> {
        let Some(&[lng, lat]) = feature.center.as_deref() else {
            return Err(malformed!("feature '{}' has no usable center", feature.place_name));
        };
        let coordinate = Coordinate::new(lat, lng)
            .map_err(|err| malformed!("feature '{}': {err}", feature.place_name))?;

        Ok(Self { label: feature.place_name, coordinate })
    }
}

/// Mapbox Places client issuing requests through a host-provided
/// [`HttpRequest`].
#[derive(Clone)]
pub struct Mapbox<H>
where
    H: HttpRequest + ?Sized,
{
    http: Arc<H>,
    base_url: String,
    token: Option<String>,
    proximity: Option<String>,
    timeout: Duration,
}

impl<H> Mapbox<H>
where
    H: HttpRequest,
{
    pub fn new(http: Arc<H>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            token: None,
            proximity: Some(DEFAULT_PROXIMITY.to_string()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Access token sent with every request. Blank tokens count as missing.
    #[must_use]
    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|token| !token.trim().is_empty());
        self
    }

    /// Bias forward lookups toward `proximity`; `None` disables the bias.
    #[must_use]
    pub fn proximity(mut self, proximity: Option<Coordinate>) -> Self {
        self.proximity = proximity.map(|at| format!("{},{}", at.lng(), at.lat()));
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn forward_url(&self, query: &str, limit: usize, token: &str) -> String {
        let mut url = format!(
            "{}/{PLACES_PATH}/{}.json?access_token={}&limit={limit}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(token)
        );
        if let Some(proximity) = &self.proximity {
            url.push_str("&proximity=");
            url.push_str(proximity);
        }
        url
    }

    fn reverse_url(&self, coordinate: Coordinate, token: &str) -> String {
        format!(
            "{}/{PLACES_PATH}/{},{}.json?access_token={}&limit=1",
            self.base_url,
            coordinate.lng(),
            coordinate.lat(),
            urlencoding::encode(token)
        )
    }

    fn require_token(&self) -> Result<&str> {
        self.token.as_deref().ok_or_else(|| {
            warn!(monotonic_counter.geocoding_errors = 1, "Mapbox token is not configured");
            Error::Geocoding("Mapbox token is not configured".to_string())
        })
    }

    async fn get(&self, url: String, operation: &str) -> Result<FeatureCollection> {
        let request = http::Request::builder()
            .method(Method::GET)
            .uri(url)
            .header(ACCEPT, "application/json")
            .body(Bytes::new())
            .with_context(|| format!("building {operation} request"))?;

        let response = fetch_within(self.http.as_ref(), request, self.timeout, UPSTREAM)
            .await
            .map_err(|err| match err {
                Error::UpstreamUnavailable { message, .. } => Error::Geocoding(message),
                err => err,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                monotonic_counter.geocoding_errors = 1,
                operation,
                status = status.as_u16(),
                "Mapbox request failed"
            );
            return Err(Error::Geocoding(format!("{operation} API error: {status}")));
        }

        serde_json::from_slice(response.body())
            .map_err(|err| malformed!("decoding {operation} response: {err}"))
    }
}

impl<H> GeocodingProvider for Mapbox<H>
where
    H: HttpRequest,
{
    async fn geocode(&self, query: &str, limit: usize) -> Result<Vec<Place>> {
        let url = self.forward_url(query, limit, self.require_token()?);
        debug!(query, limit, "forward geocoding");

        let collection = self.get(url, "geocoding").await?;
        collection.features.into_iter().map(Place::try_from).collect()
    }

    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<Option<String>> {
        let url = self.reverse_url(coordinate, self.require_token()?);
        debug!(coordinate = %coordinate, "reverse geocoding");

        let collection = self.get(url, "reverse geocoding").await?;
        Ok(collection.features.into_iter().next().map(|feature| feature.place_name))
    }
}
