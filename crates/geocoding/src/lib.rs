//! # Geocoding
//!
//! Address search and reverse lookup over a [`GeocodingProvider`], with a
//! Mapbox Places implementation.
//!
//! [`GeocodingProvider`]: transit::GeocodingProvider

mod lookup;
mod mapbox;

pub use self::lookup::{UNKNOWN_LOCATION, describe_location, geocode, resolve_address};
pub use self::mapbox::{DEFAULT_BASE_URL, DEFAULT_PROXIMITY, DEFAULT_TIMEOUT, Mapbox};
