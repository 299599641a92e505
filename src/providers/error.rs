// Remote call errors
//
// Every failure mode of the completion service. All of them are recovered
// by the responder; the kind only matters for logs and metrics.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteCallError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded{}", .retry_after_secs.map(|s| format!(", retry after {}s", s)).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Request timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Completion service not configured")]
    Unavailable,
}

impl RemoteCallError {
    /// Short, stable label for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteCallError::Network(_) => "network",
            RemoteCallError::Authentication(_) => "auth",
            RemoteCallError::RateLimited { .. } => "rate_limit",
            RemoteCallError::Timeout(_) => "timeout",
            RemoteCallError::MalformedResponse(_) => "malformed_response",
            RemoteCallError::Api { .. } => "api",
            RemoteCallError::Cancelled => "cancelled",
            RemoteCallError::Unavailable => "unavailable",
        }
    }
}
