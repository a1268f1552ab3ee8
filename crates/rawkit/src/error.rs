//! Error types for RAW service operations.
//!
//! Errors are categorized so callers can tell an unreachable service
//! (stop everything) from a request the service refused (skip and move on).

use std::fmt;
use thiserror::Error;

/// Categories of service errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection refused, DNS failure, timeout or 5xx response
    Network,
    /// Missing or rejected credentials (401/403)
    Auth,
    /// The named resource does not exist (404)
    NotFound,
    /// The named resource already exists (409)
    Conflict,
    /// The service refused the request (other 4xx, e.g. a bad script)
    Rejected,
    /// The response body could not be decoded
    Format,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Whether the service should be considered unreachable for the rest of a pass.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Network | Self::Auth)
    }

    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Service unreachable",
            Self::Auth => "Authentication failed",
            Self::NotFound => "Resource not found",
            Self::Conflict => "Resource already exists",
            Self::Rejected => "Request rejected",
            Self::Format => "Invalid response",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check that the executor and credentials services are running",
            Self::Auth => "Check the access token passed to the client",
            Self::NotFound => "The resource may have been removed concurrently",
            Self::Conflict => "Another writer registered the same name during the pass",
            Self::Rejected => "Check the definition file for errors",
            Self::Format => "The service may be running an incompatible API version",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors returned by a [`Backend`](crate::backend::Backend).
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure or server-side error
    #[error("network error calling {endpoint}: {message}")]
    Network {
        /// Endpoint path that failed
        endpoint: String,
        /// Detailed error message
        message: String,
    },

    /// Non-success HTTP status
    #[error("{endpoint} returned HTTP {status}: {message}")]
    Status {
        /// Endpoint path that failed
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// Response body or reason, if any
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("invalid response from {endpoint}: {message}")]
    InvalidResponse {
        /// Endpoint path that failed
        endpoint: String,
        /// Decoder message
        message: String,
    },

    /// Client misconfiguration (bad URL, zero timeout)
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a status error.
    pub fn status(endpoint: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a network error.
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Network { .. } => ErrorCategory::Network,
            Error::Status { status, .. } => match status {
                401 | 403 => ErrorCategory::Auth,
                404 => ErrorCategory::NotFound,
                409 => ErrorCategory::Conflict,
                400..=499 => ErrorCategory::Rejected,
                500..=599 => ErrorCategory::Network,
                _ => ErrorCategory::Other,
            },
            Error::InvalidResponse { .. } => ErrorCategory::Format,
            Error::Config(_) | Error::Other(_) => ErrorCategory::Other,
        }
    }

    /// Whether the service should be considered unreachable.
    pub fn is_unavailable(&self) -> bool {
        self.category().is_unavailable()
    }
}

/// Result type for RAW service operations.
pub type Result<T> = std::result::Result<T, Error>;
