use ga4_mcp_providers::ProviderError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    PermissionDenied,
    Unauthenticated,
}

#[derive(Debug, Error)]
pub enum AdapterError {
    /// Bad or missing input, raised before any network call.
    #[error("{0}")]
    Validation(String),
    /// Token rejected while building a client.
    #[error("Failed to initialize client with provided token: {0}")]
    Credential(String),
    #[error("{message}")]
    Authorization { failure: AuthFailure, message: String },
    #[error("{0}")]
    Provider(String),
    #[error("{0}")]
    Unexpected(String),
}

impl From<ProviderError> for AdapterError {
    fn from(err: ProviderError) -> Self {
        if err.is_permission_denied() {
            return AdapterError::Authorization {
                failure: AuthFailure::PermissionDenied,
                message: err.to_string(),
            };
        }
        if err.is_unauthenticated() {
            return AdapterError::Authorization {
                failure: AuthFailure::Unauthenticated,
                message: err.to_string(),
            };
        }

        match err {
            ProviderError::Credential(msg) => AdapterError::Credential(msg),
            ProviderError::Parse(msg) => {
                AdapterError::Unexpected(format!("Malformed provider response: {}", msg))
            }
            other @ (ProviderError::Http(_) | ProviderError::Api { .. }) => {
                AdapterError::Provider(other.to_string())
            }
        }
    }
}
