pub mod adapter;
pub mod ambient;
pub mod date_range;
pub mod error;
pub mod flatten;
pub mod types;
pub mod worker_pool;

pub use adapter::AnalyticsAdapter;
pub use ambient::AmbientCell;
pub use date_range::{resolve_date_range, resolve_date_range_at, DateAlias};
pub use error::{AdapterError, AuthFailure};
pub use flatten::{filter_metadata, flatten_response};
pub use types::*;
pub use worker_pool::{WorkerPool, DEFAULT_WORKERS};
