//! Service errors.

use vendorboard_cache::CacheError;
use vendorboard_client::ApiError;
use vendorboard_core::ValidationError;

/// Errors returned by the services.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Input rejected before any remote call
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Remote call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Server completed the call but reported failure
    #[error("{0}")]
    Rejected(String),

    /// Cache could not store or read the value
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl ServiceError {
    /// Message suitable for a notification.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Api(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
