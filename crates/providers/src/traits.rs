use crate::types::{Metadata, ReportResponse, RunRealtimeReportRequest, RunReportRequest};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Credential error: {0}")]
    Credential(String),
}

impl ProviderError {
    pub fn is_permission_denied(&self) -> bool {
        match self {
            ProviderError::Api { status, code, .. } => {
                code.as_deref() == Some("PERMISSION_DENIED")
                    || (code.is_none() && *status == 403)
            }
            _ => false,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        match self {
            ProviderError::Api { status, code, .. } => {
                code.as_deref() == Some("UNAUTHENTICATED") || (code.is_none() && *status == 401)
            }
            _ => false,
        }
    }
}

/// A handle on the analytics data API bound to one identity.
#[async_trait]
pub trait AnalyticsClient: Send + Sync {
    async fn run_report(&self, request: RunReportRequest) -> Result<ReportResponse, ProviderError>;

    async fn run_realtime_report(
        &self,
        request: RunRealtimeReportRequest,
    ) -> Result<ReportResponse, ProviderError>;

    /// `name` is the full resource name, `properties/{id}/metadata`.
    async fn get_metadata(&self, name: &str) -> Result<Metadata, ProviderError>;

    async fn close(&self) -> Result<(), ProviderError>;
}

/// Builds clients for the two credential modes.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// Client backed by the process's ambient (application default) identity.
    async fn ambient(&self) -> Result<Arc<dyn AnalyticsClient>, ProviderError>;

    /// Call-scoped client bound to a caller-supplied bearer token.
    fn with_access_token(&self, access_token: &str)
        -> Result<Arc<dyn AnalyticsClient>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, code: Option<&str>) -> ProviderError {
        ProviderError::Api {
            status,
            code: code.map(str::to_string),
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_status_code_wins_over_http_status() {
        assert!(api(403, Some("PERMISSION_DENIED")).is_permission_denied());
        assert!(!api(403, Some("RESOURCE_EXHAUSTED")).is_permission_denied());
        assert!(api(401, Some("UNAUTHENTICATED")).is_unauthenticated());
    }

    #[test]
    fn test_http_status_fallback() {
        assert!(api(403, None).is_permission_denied());
        assert!(api(401, None).is_unauthenticated());
        assert!(!api(500, None).is_permission_denied());
        assert!(!ProviderError::Http("reset".into()).is_unauthenticated());
    }
}
