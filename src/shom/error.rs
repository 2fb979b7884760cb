//! Errors raised by the REFMAR observation API client.
//!
//! [`ApiError`] separates the three ways a call can go wrong: the server
//! answered with a status we did not expect, the transport failed, or the
//! body could not be decoded.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered, but not with the status the call requires
    /// (202 for a submission, 2xx otherwise).
    #[error("unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// DNS, connection, TLS or timeout failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The body was not the JSON document we expected.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
}
