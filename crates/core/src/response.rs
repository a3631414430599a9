//! Response envelope shared by every backend endpoint.

use serde::{Deserialize, Serialize};

/// Fallback text when a failed envelope carries no message.
pub const UNKNOWN_ERROR: &str = "An unknown error occurred";

/// `{success, message, data?, errors}` wrapper returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the server reports success
    pub success: bool,

    /// Server message
    #[serde(default)]
    pub message: String,

    /// Payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error messages
    #[serde(default)]
    pub errors: Vec<String>,
}

impl<T> ApiResponse<T> {
    /// A successful envelope.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// A failed envelope.
    pub fn failure(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors,
        }
    }

    /// Unwrap the payload, dropping the envelope.
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Message to show for a failed envelope: first error, else the message.
    pub fn failure_message(&self) -> String {
        self.errors
            .iter()
            .find(|e| !e.trim().is_empty())
            .cloned()
            .or_else(|| (!self.message.trim().is_empty()).then(|| self.message.clone()))
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
    }

    /// Transform the payload.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            message: self.message,
            data: self.data.map(f),
            errors: self.errors,
        }
    }
}
