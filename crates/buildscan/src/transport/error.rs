//! Transport error types.

use thiserror::Error;

/// Errors raised by a single round trip to the scan service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    ClientSetup(String),

    /// Connection, timeout or other network failure.
    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// The service answered with a non-success status.
    #[error("Service returned {status}: {}", .message.as_deref().unwrap_or("request failed"))]
    Server {
        status: u16,
        /// Message extracted from the JSON error body, if any.
        message: Option<String>,
    },

    /// A success response whose body did not match the expected shape.
    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl TransportError {
    /// Message the service itself supplied, when there was one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            TransportError::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Server message, or `fallback` when the service gave none.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;
