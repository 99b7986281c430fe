use crate::error::AdapterError;
use crate::worker_pool::WorkerPool;
use ga4_mcp_providers::{AnalyticsClient, ClientFactory};
use std::sync::Arc;
use tokio::sync::Mutex;

enum AmbientState {
    Uninitialized,
    Ready(Arc<dyn AnalyticsClient>),
    Closed,
}

impl AmbientState {
    fn label(&self) -> &'static str {
        match self {
            AmbientState::Uninitialized => "uninitialized",
            AmbientState::Ready(_) => "ready",
            AmbientState::Closed => "closed",
        }
    }
}

/// Process-wide default-credential client, built on first use.
///
/// The lock is held across construction so concurrent first callers wait on
/// the single in-flight build instead of starting their own.
pub struct AmbientCell {
    state: Mutex<AmbientState>,
}

impl AmbientCell {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AmbientState::Uninitialized),
        }
    }

    pub async fn resolve(
        &self,
        factory: &Arc<dyn ClientFactory>,
        pool: &WorkerPool,
    ) -> Result<Arc<dyn AnalyticsClient>, AdapterError> {
        let mut state = self.state.lock().await;
        match &*state {
            AmbientState::Ready(client) => return Ok(client.clone()),
            AmbientState::Closed => {
                return Err(AdapterError::Unexpected(
                    "ambient client is closed".to_string(),
                ))
            }
            AmbientState::Uninitialized => {}
        }

        tracing::info!("Initializing ambient analytics client");
        let factory = factory.clone();
        // A failed build leaves the cell uninitialized so the next call retries.
        let client = pool
            .execute(async move { factory.ambient().await.map_err(AdapterError::from) })
            .await?;
        *state = AmbientState::Ready(client.clone());
        Ok(client)
    }

    /// Releases the client if one was built. Safe to call more than once.
    pub async fn close(&self, pool: &WorkerPool) {
        let previous = {
            let mut state = self.state.lock().await;
            std::mem::replace(&mut *state, AmbientState::Closed)
        };

        if let AmbientState::Ready(client) = previous {
            let released = pool
                .execute(async move { client.close().await.map_err(AdapterError::from) })
                .await;
            match released {
                Ok(()) => tracing::info!("Ambient analytics client released"),
                Err(e) => tracing::warn!("Failed to release ambient client: {}", e),
            }
        }
    }

    pub async fn is_closed(&self) -> bool {
        matches!(*self.state.lock().await, AmbientState::Closed)
    }

    pub async fn state_label(&self) -> &'static str {
        self.state.lock().await.label()
    }
}

impl Default for AmbientCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ga4_mcp_providers::types::*;
    use ga4_mcp_providers::ProviderError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NullClient {
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl AnalyticsClient for NullClient {
        async fn run_report(&self, _: RunReportRequest) -> Result<ReportResponse, ProviderError> {
            Ok(ReportResponse::default())
        }

        async fn run_realtime_report(
            &self,
            _: RunRealtimeReportRequest,
        ) -> Result<ReportResponse, ProviderError> {
            Ok(ReportResponse::default())
        }

        async fn get_metadata(&self, name: &str) -> Result<Metadata, ProviderError> {
            Ok(Metadata {
                name: name.to_string(),
                ..Metadata::default()
            })
        }

        async fn close(&self) -> Result<(), ProviderError> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FlakyFactory {
        attempts: AtomicUsize,
        fail_first: bool,
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ClientFactory for FlakyFactory {
        async fn ambient(&self) -> Result<Arc<dyn AnalyticsClient>, ProviderError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && attempt == 0 {
                return Err(ProviderError::Credential("no default credentials".into()));
            }
            Ok(Arc::new(NullClient {
                closed: self.closed.clone(),
            }))
        }

        fn with_access_token(&self, _: &str) -> Result<Arc<dyn AnalyticsClient>, ProviderError> {
            Err(ProviderError::Credential("unused".into()))
        }
    }

    fn factory(fail_first: bool) -> (Arc<FlakyFactory>, Arc<AtomicUsize>) {
        let closed = Arc::new(AtomicUsize::new(0));
        let factory = Arc::new(FlakyFactory {
            attempts: AtomicUsize::new(0),
            fail_first,
            closed: closed.clone(),
        });
        (factory, closed)
    }

    #[tokio::test]
    async fn test_failed_build_allows_retry() {
        let pool = WorkerPool::new(1).unwrap();
        let (concrete, _) = factory(true);
        let dyn_factory: Arc<dyn ClientFactory> = concrete.clone();
        let cell = AmbientCell::new();

        assert!(cell.resolve(&dyn_factory, &pool).await.is_err());
        assert_eq!(cell.state_label().await, "uninitialized");

        assert!(cell.resolve(&dyn_factory, &pool).await.is_ok());
        assert_eq!(cell.state_label().await, "ready");
        assert_eq!(concrete.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_close_releases_once() {
        let pool = WorkerPool::new(1).unwrap();
        let (concrete, closed) = factory(false);
        let dyn_factory: Arc<dyn ClientFactory> = concrete;
        let cell = AmbientCell::new();

        cell.resolve(&dyn_factory, &pool).await.unwrap();
        cell.close(&pool).await;
        cell.close(&pool).await;

        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert!(cell.is_closed().await);

        let err = cell.resolve(&dyn_factory, &pool).await.err().unwrap();
        assert!(matches!(err, AdapterError::Unexpected(_)));
        assert!(err.to_string().contains("closed"));
    }

    #[tokio::test]
    async fn test_close_before_first_use() {
        let pool = WorkerPool::new(1).unwrap();
        let (concrete, closed) = factory(false);
        let dyn_factory: Arc<dyn ClientFactory> = concrete.clone();
        let cell = AmbientCell::new();

        cell.close(&pool).await;
        assert!(cell.is_closed().await);
        assert!(cell.resolve(&dyn_factory, &pool).await.is_err());
        assert_eq!(concrete.attempts.load(Ordering::SeqCst), 0);
        assert_eq!(closed.load(Ordering::SeqCst), 0);
    }
}
