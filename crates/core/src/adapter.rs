use crate::ambient::AmbientCell;
use crate::date_range::resolve_date_range;
use crate::error::AdapterError;
use crate::flatten::{filter_metadata, flatten_response};
use crate::types::*;
use crate::worker_pool::{WorkerPool, DEFAULT_WORKERS};
use ga4_mcp_providers::types::{
    DateRange, Dimension, Metric, RunRealtimeReportRequest, RunReportRequest,
};
use ga4_mcp_providers::{AnalyticsClient, ClientFactory};
use std::sync::Arc;

/// Translates tool-level requests into Data API calls and normalizes what
/// comes back.
pub struct AnalyticsAdapter {
    factory: Arc<dyn ClientFactory>,
    pool: WorkerPool,
    ambient: AmbientCell,
    default_property_id: Option<String>,
}

impl AnalyticsAdapter {
    pub fn new(
        factory: Arc<dyn ClientFactory>,
        default_property_id: Option<String>,
    ) -> std::io::Result<Self> {
        Self::with_workers(factory, default_property_id, DEFAULT_WORKERS)
    }

    pub fn with_workers(
        factory: Arc<dyn ClientFactory>,
        default_property_id: Option<String>,
        workers: usize,
    ) -> std::io::Result<Self> {
        let default_property_id = default_property_id.filter(|id| !id.is_empty());
        Ok(Self {
            factory,
            pool: WorkerPool::new(workers)?,
            ambient: AmbientCell::new(),
            default_property_id,
        })
    }

    pub fn default_property_id(&self) -> Option<&str> {
        self.default_property_id.as_deref()
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// An explicit non-empty id wins over the process default.
    pub fn resolve_property(&self, property_id: Option<&str>) -> Result<String, AdapterError> {
        property_id
            .filter(|id| !id.is_empty())
            .or(self.default_property_id.as_deref())
            .map(str::to_string)
            .ok_or_else(|| {
                AdapterError::Validation(
                    "No property ID provided (neither specific nor default).".to_string(),
                )
            })
    }

    pub async fn resolve_client(
        &self,
        credential: &CredentialRef,
    ) -> Result<Arc<dyn AnalyticsClient>, AdapterError> {
        match credential {
            CredentialRef::Ambient => self.ambient.resolve(&self.factory, &self.pool).await,
            CredentialRef::Token(token) => {
                tracing::debug!("Building token-scoped analytics client");
                let factory = self.factory.clone();
                let token = token.clone();
                self.pool
                    .execute(async move {
                        factory.with_access_token(&token).map_err(|e| {
                            tracing::error!("Failed to create token-based client: {}", e);
                            AdapterError::from(e)
                        })
                    })
                    .await
            }
        }
    }

    /// Probes the default property's metadata with the ambient client.
    /// Returns `true` without probing when no default property is configured.
    pub async fn verify_ambient_auth(&self) -> Result<bool, AdapterError> {
        let Some(property_id) = self.default_property_id.clone() else {
            tracing::warn!("No default property ID provided, skipping auth verification");
            return Ok(true);
        };

        tracing::info!("Verifying ambient authentication");
        let client = self.ambient.resolve(&self.factory, &self.pool).await?;
        let name = metadata_resource(&property_id);
        let probe = self
            .pool
            .execute(async move { client.get_metadata(&name).await.map_err(AdapterError::from) })
            .await;

        match probe {
            Ok(_) => {
                tracing::info!("Ambient authentication verified");
                Ok(true)
            }
            Err(e) => {
                tracing::error!("Ambient authentication verification failed: {}", e);
                Err(e)
            }
        }
    }

    pub async fn run_report(&self, spec: ReportRequestSpec) -> Result<TabularResult, AdapterError> {
        require_metrics(&spec.metric_names)?;
        let property_id = self.resolve_property(spec.property_id.as_deref())?;
        let range = resolve_date_range(&spec.date_range)?;

        let request = RunReportRequest {
            property: property_resource(&property_id),
            dimensions: dimensions(&spec.dimension_names),
            metrics: metrics(&spec.metric_names),
            date_ranges: vec![DateRange {
                start_date: range.start_date,
                end_date: range.end_date,
            }],
            limit: spec.row_limit,
        };

        tracing::debug!(
            "run_report for {} using {} client",
            property_id,
            credential_label(&spec.credential)
        );
        let client = self.resolve_client(&spec.credential).await?;
        let response = self
            .pool
            .execute(async move { client.run_report(request).await.map_err(AdapterError::from) })
            .await
            .map_err(|e| {
                tracing::error!("Error running report for property {}: {}", property_id, e);
                e
            })?;

        Ok(flatten_response(&response))
    }

    pub async fn run_realtime_report(
        &self,
        spec: RealtimeRequestSpec,
    ) -> Result<TabularResult, AdapterError> {
        require_metrics(&spec.metric_names)?;
        let property_id = self.resolve_property(spec.property_id.as_deref())?;

        let request = RunRealtimeReportRequest {
            property: property_resource(&property_id),
            dimensions: dimensions(&spec.dimension_names),
            metrics: metrics(&spec.metric_names),
            limit: spec.row_limit,
        };

        tracing::debug!(
            "run_realtime_report for {} using {} client",
            property_id,
            credential_label(&spec.credential)
        );
        let client = self.resolve_client(&spec.credential).await?;
        let response = self
            .pool
            .execute(async move {
                client
                    .run_realtime_report(request)
                    .await
                    .map_err(AdapterError::from)
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    "Error running realtime report for property {}: {}",
                    property_id,
                    e
                );
                e
            })?;

        Ok(flatten_response(&response))
    }

    pub async fn get_metadata(
        &self,
        property_id: Option<&str>,
        metadata_type: &str,
        credential: &CredentialRef,
    ) -> Result<MetadataResult, AdapterError> {
        let property_id = self.resolve_property(property_id)?;
        let metadata_type: MetadataType = metadata_type.parse()?;

        tracing::debug!(
            "get_metadata for {} using {} client",
            property_id,
            credential_label(credential)
        );
        let client = self.resolve_client(credential).await?;
        let name = metadata_resource(&property_id);
        let metadata = self
            .pool
            .execute(async move { client.get_metadata(&name).await.map_err(AdapterError::from) })
            .await
            .map_err(|e| {
                tracing::error!("Error getting metadata for property {}: {}", property_id, e);
                e
            })?;

        Ok(filter_metadata(&metadata, metadata_type))
    }

    /// Releases the ambient client, then drains the pool.
    pub async fn close(&self) {
        self.ambient.close(&self.pool).await;
        self.pool.shutdown().await;
    }

    pub async fn is_closed(&self) -> bool {
        self.ambient.is_closed().await
    }
}

fn require_metrics(metric_names: &[String]) -> Result<(), AdapterError> {
    if metric_names.is_empty() {
        return Err(AdapterError::Validation(
            "At least one metric must be specified".to_string(),
        ));
    }
    Ok(())
}

fn property_resource(property_id: &str) -> String {
    format!("properties/{}", property_id)
}

fn metadata_resource(property_id: &str) -> String {
    format!("properties/{}/metadata", property_id)
}

fn metrics(names: &[String]) -> Vec<Metric> {
    names.iter().map(|name| Metric { name: name.clone() }).collect()
}

fn dimensions(names: &[String]) -> Vec<Dimension> {
    names
        .iter()
        .map(|name| Dimension { name: name.clone() })
        .collect()
}

fn credential_label(credential: &CredentialRef) -> &'static str {
    match credential {
        CredentialRef::Ambient => "ambient",
        CredentialRef::Token(_) => "token-based",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let names = vec!["country".to_string(), "city".to_string()];
        let dims = dimensions(&names);
        assert_eq!(dims[1].name, "city");
        assert_eq!(property_resource("123"), "properties/123");
        assert_eq!(metadata_resource("123"), "properties/123/metadata");
        assert!(require_metrics(&[]).is_err());
        assert!(require_metrics(&["sessions".to_string()]).is_ok());
    }
}
