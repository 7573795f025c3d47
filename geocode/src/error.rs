//! Geocoding error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The address exists but no congressional district could be
    /// determined for it (missing field, no results, empty address).
    #[error("no district found for address")]
    NotFound,

    #[error("geocoding service unreachable: {0}")]
    Unreachable(String),

    #[error("geocoding request failed: {0}")]
    RequestFailed(String),

    #[error("invalid geocoding response: {0}")]
    InvalidResponse(String),
}

/// Map a transport error onto the taxonomy.
pub(crate) fn classify(e: reqwest::Error) -> GeocodeError {
    if e.is_timeout() {
        GeocodeError::Unreachable(format!("request timed out: {e}"))
    } else if e.is_connect() {
        GeocodeError::Unreachable(format!("connection failed: {e}"))
    } else {
        GeocodeError::RequestFailed(e.to_string())
    }
}
