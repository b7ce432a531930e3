//! Error types for the backend client and adapter.
//!
//! # Design
//! `NotFound` gets a dedicated variant because the dashboard falls back to a
//! second lookup when a profile is missing. `Unauthorized` is separated so the
//! session endpoint can report "no signed-in user" as data instead of an
//! error. All other non-2xx responses land in `HttpError` with the raw status
//! code and body for debugging.

use thiserror::Error;

/// Errors returned by `BackendClient` parse methods and `Backend`
/// implementations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The query matched no rows.
    #[error("resource not found")]
    NotFound,

    /// The backend rejected the credentials (401/403).
    #[error("unauthorized (HTTP {status})")]
    Unauthorized { status: u16 },

    /// The server returned a non-2xx status not covered above.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The host transport failed before a response was received.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    /// True for the "query ran but nothing matched" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }
}
