//! Transit lookup errors

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = anyhow::Result<T, Error>;

/// Domain level error type returned by stop and arrival lookups.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Error {
    /// The caller supplied an out-of-range coordinate, a non-positive limit,
    /// or a blank identifier.
    #[error("code: 400, description: invalid_input {0}")]
    InvalidInput(String),

    /// The upstream provider could not be reached or answered with a
    /// non-success status.
    #[error("code: 502, description: upstream_unavailable ({}) {message}", status_label(.status))]
    UpstreamUnavailable { status: Option<u16>, message: String },

    /// The upstream provider did not answer within the configured timeout.
    #[error("code: 504, description: upstream_timeout {0}")]
    UpstreamTimeout(String),

    /// The upstream payload is missing required fields or cannot be decoded.
    #[error("code: 502, description: malformed_response {0}")]
    MalformedResponse(String),

    /// The geocoding provider failed or found nothing for the query.
    #[error("code: 502, description: geocoding_error {0}")]
    Geocoding(String),

    /// A non recoverable internal error occurred.
    #[error("code: 500, description: {0}")]
    Internal(String),
}

#[allow(clippy::ref_option)]
fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "no status".to_string(), |code| format!("status {code}"))
}

impl Error {
    /// Returns the HTTP status a caller should surface for the variant.
    #[must_use]
    pub const fn code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamUnavailable { .. } | Self::MalformedResponse(_) | Self::Geocoding(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error description.
    #[must_use]
    pub fn description(&self) -> String {
        self.to_string()
    }

    /// The upstream status code carried by the error, if any.
    #[must_use]
    pub const fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::UpstreamUnavailable { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        let chain = err.chain().map(ToString::to_string).collect::<Vec<_>>().join(" -> ");

        // if type is Error, return it with the newly added context
        if let Some(inner) = err.downcast_ref::<Self>() {
            tracing::debug!("Error: {err}, caused by: {inner}");

            return match inner {
                Self::InvalidInput(_) => Self::InvalidInput(chain),
                Self::UpstreamUnavailable { status, message } => {
                    Self::UpstreamUnavailable { status: *status, message: format!("{err}: {message}") }
                }
                Self::UpstreamTimeout(e) => Self::UpstreamTimeout(format!("{err}: {e}")),
                Self::MalformedResponse(e) => Self::MalformedResponse(format!("{err}: {e}")),
                Self::Geocoding(e) => Self::Geocoding(format!("{err}: {e}")),
                Self::Internal(_) => Self::Internal(chain),
            };
        }

        // otherwise, return an Internal error
        Self::Internal(chain)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

#[macro_export]
macro_rules! invalid_input {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::InvalidInput(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::InvalidInput(format!($err))
    };
}

#[macro_export]
macro_rules! malformed {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::MalformedResponse(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::MalformedResponse(format!($err))
    };
}
