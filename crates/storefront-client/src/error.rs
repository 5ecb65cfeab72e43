//! Client error taxonomy
//!
//! Recoverable expired sessions never surface here: the transport absorbs
//! them via refresh-and-retry. What callers see is the terminal shape of a
//! failure: `Unauthorized`/`Forbidden`/`RefreshFailed` after the session was
//! revoked, `Api` for any other HTTP error, `Transport` for network-level
//! failures. None of these are retried by the client.

use storefront_session::RefreshError;
use thiserror::Error;

/// Errors surfaced by the storefront client.
#[derive(Debug, Error)]
pub enum Error {
    /// Network or protocol-level request failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-auth HTTP error, passed through unchanged
    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },

    /// Terminal 401 — session already revoked when this is returned
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Terminal 403 — session already revoked when this is returned
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The shared refresh operation failed; every waiter gets this
    #[error("session refresh failed: {0}")]
    RefreshFailed(#[from] RefreshError),

    /// Token store or session failure
    #[error("session error: {0}")]
    Session(#[from] storefront_session::Error),

    /// Streaming response violated the event framing
    #[error("stream error: {0}")]
    Stream(String),

    /// Response body did not match the expected wire shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Client was misconfigured
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Map a terminal HTTP failure to its error variant.
    ///
    /// Only called after recovery has decided the failure propagates; the
    /// 401/403 arms therefore always mean the session is already revoked.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            _ => Self::Api { status, message },
        }
    }
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_status_maps_auth_statuses() {
        assert!(matches!(
            Error::from_status(401, "expired".into()),
            Error::Unauthorized(_)
        ));
        assert!(matches!(
            Error::from_status(403, "no role".into()),
            Error::Forbidden(_)
        ));
    }

    #[test]
    fn from_status_keeps_other_statuses_as_api() {
        match Error::from_status(422, "validation failed".into()) {
            Error::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "validation failed");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn refresh_error_converts_via_from() {
        let err: Error = RefreshError::MissingToken.into();
        assert!(err.to_string().contains("no refresh token"));
    }
}
