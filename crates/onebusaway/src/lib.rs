//! # OneBusAway
//!
//! [`TransitProvider`](transit::TransitProvider) backed by the OneBusAway REST
//! API.

mod client;
mod envelope;

pub use self::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, OneBusAway};
