//! Service configuration read from the environment.
//!
//! Every key has a default; blank values count as unset.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use tracing::{trace, warn};
use transit::Coordinate;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub onebusaway_base_url: String,
    pub onebusaway_api_key: Option<String>,
    pub mapbox_base_url: String,
    pub mapbox_token: Option<String>,

    /// Forward geocoding bias; `None` when disabled with `GEOCODING_PROXIMITY=none`.
    pub geocoding_proximity: Option<Coordinate>,
    pub upstream_timeout: Duration,
    pub listen_addr: SocketAddr,
}

impl Config {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key).map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
        };

        let string_or = |key: &str, default: &str| {
            get(key).unwrap_or_else(|| {
                trace!("{key} not set, using default: {default}");
                default.to_string()
            })
        };

        let onebusaway_api_key = get("ONEBUSAWAY_API_KEY");
        if onebusaway_api_key.is_none() {
            trace!("ONEBUSAWAY_API_KEY not set, requests are sent without a key");
        }

        let mapbox_token = get("MAPBOX_TOKEN").or_else(|| get("NEXT_PUBLIC_MAPBOX_TOKEN"));
        if mapbox_token.is_none() {
            warn!("MAPBOX_TOKEN not set, geocoding requests will fail");
        }

        let upstream_timeout =
            parse_or("UPSTREAM_TIMEOUT_MS", get("UPSTREAM_TIMEOUT_MS"), DEFAULT_TIMEOUT_MS);
        let listen_addr = parse_or("LISTEN_ADDR", get("LISTEN_ADDR"), default_listen_addr());

        Self {
            onebusaway_base_url: string_or("ONEBUSAWAY_BASE_URL", onebusaway::DEFAULT_BASE_URL),
            onebusaway_api_key,
            mapbox_base_url: string_or("MAPBOX_BASE_URL", geocoding::DEFAULT_BASE_URL),
            mapbox_token,
            geocoding_proximity: proximity(get("GEOCODING_PROXIMITY")),
            upstream_timeout: Duration::from_millis(upstream_timeout),
            listen_addr,
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    let Some(value) = value else {
        trace!("{key} not set, using default: {default}");
        return default;
    };
    value.parse().unwrap_or_else(|_| {
        warn!("{key}={value} is not valid, using default: {default}");
        default
    })
}

/// Parse a `lng,lat` pair.
fn parse_lng_lat(value: &str) -> Option<Coordinate> {
    let (lng, lat) = value.split_once(',')?;
    let lng = lng.trim().parse().ok()?;
    let lat = lat.trim().parse().ok()?;
    Coordinate::new(lat, lng).ok()
}

fn proximity(value: Option<String>) -> Option<Coordinate> {
    let default = parse_lng_lat(geocoding::DEFAULT_PROXIMITY);
    let Some(value) = value else {
        trace!("GEOCODING_PROXIMITY not set, using default: {}", geocoding::DEFAULT_PROXIMITY);
        return default;
    };
    if value.eq_ignore_ascii_case("none") {
        return None;
    }
    parse_lng_lat(&value).or_else(|| {
        warn!("GEOCODING_PROXIMITY={value} is not a lng,lat pair, using default");
        default
    })
}
