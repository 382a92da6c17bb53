//! # Nearby Transit
//!
//! HTTP service for the stops closest to a location, their upcoming
//! arrivals, and address search.

pub mod config;
pub mod http;
pub mod provider;

pub use self::config::Config;
pub use self::http::router;
pub use self::provider::Provider;
