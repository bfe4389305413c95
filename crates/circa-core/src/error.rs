//! Error types for the CIRCA application.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::design::ExtractionError;
use crate::session::Phase;

/// A shared error type for configuration and storage concerns.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum CircaError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CircaError {
    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<std::io::Error> for CircaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CircaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CircaError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, CircaError>`.
pub type Result<T> = std::result::Result<T, CircaError>;

/// Failure reported by the external text-generation service.
///
/// A `ServiceError` never leaves a session half-updated: the turn that
/// triggered the call is discarded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The call did not complete within the configured deadline.
    #[error("text service timed out after {}s", .after.as_secs())]
    Timeout { after: Duration },

    /// The service answered but produced no usable text.
    #[error("text service returned an empty completion")]
    EmptyCompletion,

    /// Network-level failure (connect, TLS, body read).
    #[error("text service transport failure: {0}")]
    Transport(String),

    /// The service rejected the request with an HTTP error.
    #[error("text service error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        retryable: bool,
    },

    /// The request could not be built (missing credentials, bad prompt, ...).
    #[error("invalid text service request: {0}")]
    InvalidRequest(String),
}

impl ServiceError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether the same request may succeed if sent again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Transport(_) => true,
            Self::Api { retryable, .. } => *retryable,
            Self::EmptyCompletion | Self::InvalidRequest(_) => false,
        }
    }
}

/// Failure while turning a generation reply into a usable design.
///
/// Every variant except `Service` carries the raw reply for diagnostics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("circuit design validation failed ({} errors)", .errors.len())]
    Validation { errors: Vec<String>, raw: String },

    #[error("circuit design could not be decoded: {message}")]
    Decode { message: String, raw: String },
}

impl GenerationError {
    /// Human-readable error lines suitable for surfacing to a user.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation { errors, .. } => errors.clone(),
            other => vec![other.to_string()],
        }
    }

    /// The raw service reply, when one was received.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::Service(_) => None,
            Self::Extraction(err) => Some(err.raw()),
            Self::Validation { raw, .. } | Self::Decode { raw, .. } => Some(raw),
        }
    }
}

/// Errors surfaced by session-level operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("session not found: {id}")]
    NotFound { id: String },

    #[error("operation '{operation}' is not allowed in phase {phase}")]
    InvalidPhase {
        phase: Phase,
        operation: &'static str,
    },

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}
