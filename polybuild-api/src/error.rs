//! Error types for polybuild-api.

use thiserror::Error;

/// Failure of a single remote call.
///
/// The split is diagnostic only: both kinds are equally fatal to the caller.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Timeout, connection failure, or a non-envelope error body.
    #[error("transport error calling {method}: {detail}")]
    Transport {
        method: String,
        /// HTTP status, when a response was received at all.
        status: Option<u16>,
        detail: String,
    },

    /// The service answered with a non-OK envelope.
    #[error("{method} rejected: {comment}")]
    Remote { method: String, comment: String },
}

impl ApiError {
    pub fn method(&self) -> &str {
        match self {
            ApiError::Transport { method, .. } | ApiError::Remote { method, .. } => method,
        }
    }
}

/// Lookup failure in the method registry. Always a programming error.
#[derive(Debug, Clone, Error)]
pub enum MethodError {
    #[error("no remote method registered for operation '{key}'")]
    Unknown { key: String },

    #[error(
        "remote method for '{key}' is unconfirmed (assumed '{assumed}'); \
         verify it and mark it confirmed in the method registry"
    )]
    Unconfirmed { key: String, assumed: &'static str },
}

/// Required API credentials are absent. Raised once, at startup.
#[derive(Debug, Clone, Error)]
#[error("missing API credentials: set {}", .missing.join(" and "))]
pub struct CredentialsError {
    pub missing: Vec<&'static str>,
}
