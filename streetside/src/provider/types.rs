//! Provider types

use std::fmt;
use std::time::Duration;

/// Errors that can occur while retrieving a tile.
///
/// Every variant is a transport failure from the assembler's point of view:
/// the affected tile is reported missing and assembly continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// HTTP request failed before a response arrived
    HttpError(String),
    /// Server answered with a non-success status
    HttpStatus { status: u16, url: String },
    /// The per-tile deadline elapsed
    Timeout(Duration),
    /// Concurrency limiter was shut down
    LimiterClosed,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::HttpStatus { status, url } => {
                write!(f, "HTTP {} from {}", status, url)
            }
            ProviderError::Timeout(after) => {
                write!(f, "Request timed out after {}ms", after.as_millis())
            }
            ProviderError::LimiterClosed => write!(f, "Request limiter closed"),
        }
    }
}

impl std::error::Error for ProviderError {}

impl ProviderError {
    /// Whether the failure was the deadline rather than the network.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout(_))
    }
}
