//! Error types for backend fetches
//!
//! Errors are classified by recoverability:
//! - Retryable: Network issues, timeouts, 5xx responses
//! - NonRetryable: Malformed or invalid payloads, 4xx responses
//! - RequiresUserAction: Configuration problems

use thiserror::Error;

/// Longest error body kept in `FetchError::HttpStatus`.
pub const MAX_ERROR_BODY_CHARS: usize = 512;

/// Error types for backend statistics fetches
#[derive(Debug, Error)]
pub enum FetchError {
    // Retryable errors
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Backend returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    // Non-retryable errors
    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Response failed validation: {0}")]
    InvalidPayload(String),

    // Requires user action
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl FetchError {
    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(_) | FetchError::Timeout(_) => true,
            FetchError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns true if this error requires user action to resolve
    pub fn requires_user_action(&self) -> bool {
        matches!(self, FetchError::Configuration(_))
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "Check that the statistics backend is running and reachable.",
            FetchError::Timeout(_) => "The backend took too long to answer. Try again.",
            FetchError::HttpStatus { status, .. } if *status >= 500 => {
                "The backend reported an internal error. Try again shortly."
            }
            FetchError::HttpStatus { .. } => "The backend rejected the request. Check the API URL.",
            FetchError::Decode(_) => "The backend answered with an unexpected format.",
            FetchError::InvalidPayload(_) => {
                "The backend answered with inconsistent data. Showing cached figures."
            }
            FetchError::Configuration(_) => {
                "Check NEXT_PUBLIC_API_URL or apiUrl in ~/.afriai/config.json"
            }
        }
    }

    /// Non-2xx response, keeping at most [`MAX_ERROR_BODY_CHARS`] of the body.
    pub fn http_status(status: u16, mut body: String) -> Self {
        if let Some((cut, _)) = body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
            body.truncate(cut);
        }
        FetchError::HttpStatus { status, body }
    }

    /// Classify a reqwest failure. `timeout_secs` is reported on timeouts.
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(timeout_secs)
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if err.is_builder() {
            FetchError::Configuration(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Serializable error representation for the HTTP surface
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardError {
    pub message: String,
    pub error_type: ErrorType,
    pub can_retry: bool,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Retryable,
    NonRetryable,
    RequiresUserAction,
}

impl From<&FetchError> for DashboardError {
    fn from(err: &FetchError) -> Self {
        let error_type = if err.requires_user_action() {
            ErrorType::RequiresUserAction
        } else if err.is_retryable() {
            ErrorType::Retryable
        } else {
            ErrorType::NonRetryable
        };

        DashboardError {
            message: err.to_string(),
            error_type,
            can_retry: err.is_retryable(),
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}
