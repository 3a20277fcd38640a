//! Generation provider clients.
//!
//! Providers are narrow collaborators: each exposes one trait method and
//! maps its transport and HTTP failures onto [`ProviderError`] so the
//! reporter can phrase them for the requester.

pub mod chat;

use std::fmt::{Display, Formatter};

/// Failure kinds shared by all generation providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The service could not be reached.
    Connection(String),
    /// The service answered with an unexpected error status.
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },
    /// The request was rejected as malformed.
    InvalidRequest(String),
    /// The API key was missing, wrong, or lacks permission.
    Authentication(String),
    /// The service is throttling requests.
    RateLimited(String),
    /// The response could not be decoded.
    MalformedResponse(String),
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(msg) => write!(f, "connection failed: {msg}"),
            Self::Api { status, message } => write!(f, "api error ({status}): {message}"),
            Self::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            Self::Authentication(msg) => write!(f, "authentication failed: {msg}"),
            Self::RateLimited(msg) => write!(f, "rate limited: {msg}"),
            Self::MalformedResponse(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Classify a non-success HTTP status returned by a provider.
#[must_use]
pub fn classify_status(status: u16, message: String) -> ProviderError {
    match status {
        401 | 403 => ProviderError::Authentication(message),
        429 => ProviderError::RateLimited(message),
        400 | 404 | 413 | 422 => ProviderError::InvalidRequest(message),
        _ => ProviderError::Api { status, message },
    }
}
