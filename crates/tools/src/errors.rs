use ga4_mcp_core::{AdapterError, AuthFailure};
use serde::{Deserialize, Serialize};

pub const GENERIC_ERROR_MESSAGE: &str =
    "An unexpected server error occurred. Check the server logs for details.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PermissionDenied,
    Unauthenticated,
    ApiError,
    ValueError,
    UnexpectedServerError,
}

impl ErrorKind {
    pub fn classify(err: &AdapterError) -> Self {
        match err {
            AdapterError::Validation(_) => ErrorKind::ValueError,
            AdapterError::Credential(_) => ErrorKind::ApiError,
            AdapterError::Authorization {
                failure: AuthFailure::PermissionDenied,
                ..
            } => ErrorKind::PermissionDenied,
            AdapterError::Authorization {
                failure: AuthFailure::Unauthenticated,
                ..
            } => ErrorKind::Unauthenticated,
            AdapterError::Provider(_) => ErrorKind::ApiError,
            AdapterError::Unexpected(_) => ErrorKind::UnexpectedServerError,
        }
    }
}

/// Uniform failure shape returned to callers: `{status, message, error_type}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub status: String,
    pub message: String,
    pub error_type: ErrorKind,
}

impl ErrorPayload {
    pub fn new(error_type: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            error_type,
        }
    }

    /// `context` names the operation, e.g. "running report", and only shows
    /// up in logs.
    pub fn from_adapter_error(context: &str, err: &AdapterError) -> Self {
        let kind = ErrorKind::classify(err);
        match kind {
            ErrorKind::UnexpectedServerError => {
                tracing::error!("Unexpected error {}: {:?}", context, err);
                Self::new(kind, GENERIC_ERROR_MESSAGE)
            }
            _ => {
                tracing::warn!("Error {}: {}", context, err);
                Self::new(kind, err.to_string())
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "status": self.status,
            "message": self.message,
            "error_type": self.error_type,
        })
    }
}
