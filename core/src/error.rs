//! Error types for the catalog client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because deleting an asset that is
//! already gone is a common outcome callers want to tell apart. All other
//! non-2xx responses land in `HttpError` with the raw status and body so the
//! caller can print the service's diagnostics.

use thiserror::Error;

/// Errors returned by the catalog client, executor and credential cache.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, TLS, I/O).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx, non-redirect status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// A response lacked a header the operation depends on.
    #[error("response is missing the {0} header")]
    MissingHeader(&'static str),

    /// The redirect chain was longer than the configured limit.
    #[error("gave up after {max} redirects")]
    TooManyRedirects { max: usize },

    /// A URL could not be parsed or joined.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The token provider could not produce a bearer token.
    #[error("token acquisition failed: {0}")]
    Token(String),
}

impl ApiError {
    /// Status code carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Non-empty error body returned by the server.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::HttpError { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }
}
