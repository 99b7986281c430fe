pub mod constants;
pub mod credentials;
pub mod data_api;
pub mod traits;
pub mod types;

pub use credentials::{CredentialSource, CredentialsFile, TokenProvider};
pub use data_api::{DataApiClient, DataApiClientFactory};
pub use traits::{AnalyticsClient, ClientFactory, ProviderError};
