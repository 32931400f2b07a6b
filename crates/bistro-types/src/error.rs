//! Transport failure shared by every remote collaborator.

use thiserror::Error;

/// A remote call failed (network, HTTP status, storage, decode).
///
/// Deliberately opaque: callers treat every transport failure the same way,
/// so the cause is carried as text for logs and notifications only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transport error: {message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// Human-readable cause.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        Self::new(format!("io: {e}"))
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("decode: {e}"))
    }
}
