//! Remote call errors.

/// Errors raised by a backend call.
///
/// Cloneable so one failure can be handed to every caller sharing a fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Server answered 401; the session has been cleared
    #[error("Session expired. Please sign in again.")]
    Unauthorized,

    /// An upstream filter rejected the request with an HTML page
    #[error("The requested URL was rejected. Please consult with your administrator. Your support ID is: {support_id}")]
    Rejected {
        /// Ticket number from the rejection page
        support_id: String,
    },

    /// Non-2xx status
    #[error("HTTP {status}: {message}")]
    Http {
        /// Status code
        status: u16,
        /// Server message, or the status reason
        message: String,
    },

    /// No response within the request timeout
    #[error("Request timed out")]
    Timeout,

    /// Connection or protocol failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }

    /// Message suitable for a notification.
    ///
    /// HTTP errors show the server message alone.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type for backend calls.
pub type Result<T> = std::result::Result<T, ApiError>;
