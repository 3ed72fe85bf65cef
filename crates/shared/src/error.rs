use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body the gateway attaches to non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[derive(Debug, Error)]
#[error("gateway rejected {operation} ({status}): {message}")]
pub struct GatewayRejection {
    pub operation: &'static str,
    pub status: u16,
    pub message: String,
}

impl GatewayRejection {
    /// Builds a rejection from a raw response body, preferring the gateway's
    /// `{"error": ...}` message and falling back to the trimmed body text.
    pub fn from_body(operation: &'static str, status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ApiError>(body) {
            Ok(api_error) => api_error.error,
            Err(_) if body.trim().is_empty() => "no response body".to_string(),
            Err(_) => body.trim().to_string(),
        };
        Self {
            operation,
            status,
            message,
        }
    }
}
