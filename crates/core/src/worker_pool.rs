use crate::error::AdapterError;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::Semaphore;

pub const DEFAULT_WORKERS: usize = 5;

/// Fixed-width pool that runs provider I/O away from the orchestration loop.
///
/// Jobs run on a dedicated multi-threaded runtime; a semaphore of the same
/// width bounds how many are in flight.
pub struct WorkerPool {
    runtime: Mutex<Option<Runtime>>,
    handle: Handle,
    permits: Arc<Semaphore>,
    width: usize,
}

impl WorkerPool {
    pub fn new(width: usize) -> std::io::Result<Self> {
        let width = width.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(width)
            .thread_name("ga4-worker")
            .enable_all()
            .build()?;
        let handle = runtime.handle().clone();

        Ok(Self {
            runtime: Mutex::new(Some(runtime)),
            handle,
            permits: Arc::new(Semaphore::new(width)),
            width,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn in_flight(&self) -> usize {
        self.width - self.permits.available_permits()
    }

    pub async fn execute<F, T>(&self, job: F) -> Result<T, AdapterError>
    where
        F: Future<Output = Result<T, AdapterError>> + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AdapterError::Unexpected("Worker pool is shut down".to_string()))?;

        // The permit travels with the job so a dropped caller cannot free a
        // slot while the job is still running.
        let handle = self.handle.spawn(async move {
            let _permit = permit;
            job.await
        });

        match handle.await {
            Ok(result) => result,
            Err(join_err) if join_err.is_panic() => {
                tracing::error!("Worker job panicked");
                Err(AdapterError::Unexpected("Worker job panicked".to_string()))
            }
            Err(_) => Err(AdapterError::Unexpected("Worker job was cancelled".to_string())),
        }
    }

    /// Waits for in-flight jobs to finish, then stops the pool. New jobs are
    /// rejected from this point on.
    pub async fn shutdown(&self) {
        if self.permits.is_closed() {
            return;
        }

        match self.permits.acquire_many(self.width as u32).await {
            Ok(all) => {
                self.permits.close();
                drop(all);
            }
            Err(_) => return,
        }

        if let Some(runtime) = self.runtime.lock().take() {
            runtime.shutdown_background();
        }
        tracing::info!("Worker pool shut down");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Dropping a runtime from async context panics; detach instead.
        if let Some(runtime) = self.runtime.get_mut().take() {
            runtime.shutdown_background();
        }
    }
}
