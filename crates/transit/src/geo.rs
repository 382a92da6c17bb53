//! # Geodesy
//!
//! WGS84 coordinates and great-circle distance.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, invalid_input};

/// Mean Earth radius used by the haversine formula, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A WGS84 position in decimal degrees.
///
/// Construction validates `-90 ≤ lat ≤ 90` and `-180 ≤ lng ≤ 180`, including
/// when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LatLng")]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude in degrees.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when either component is not finite or
    /// is outside the WGS84 range.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(invalid_input!("latitude {lat} is outside -90..=90"));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(invalid_input!("longitude {lng} is outside -180..=180"));
        }
        Ok(Self { lat, lng })
    }

    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }

    /// Great-circle distance to `other`, in meters.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        haversine_distance(self, other)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

#[derive(Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl TryFrom<LatLng> for Coordinate {
    type Error = Error;

    fn try_from(value: LatLng) -> Result<Self> {
        Self::new(value.lat, value.lng)
    }
}

fn radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

/// Haversine distance between two coordinates, in meters.
///
/// The operation order is fixed so results are reproducible bit for bit:
/// `a = sin²(Δφ/2) + cos φ1 · cos φ2 · sin²(Δλ/2)`,
/// `c = 2 · atan2(√a, √(1 − a))`, `d = R · c`.
#[must_use]
pub fn haversine_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    let phi1 = radians(from.lat);
    let phi2 = radians(to.lat);
    let delta_phi = radians(to.lat - from.lat);
    let delta_lambda = radians(to.lng - from.lng);

    let half_phi = (delta_phi / 2.0).sin();
    let half_lambda = (delta_lambda / 2.0).sin();
    let a = half_phi * half_phi + phi1.cos() * phi2.cos() * half_lambda * half_lambda;
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}
