use crate::constants::*;
use crate::credentials::{discover_ambient, validate_access_token, CredentialSource, TokenProvider};
use crate::traits::*;
use crate::types::*;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// GA4 Data API client over REST.
pub struct DataApiClient {
    client: Client,
    base_url: String,
    tokens: TokenProvider,
}

impl DataApiClient {
    pub fn new(client: Client, base_url: String, source: CredentialSource) -> Self {
        let tokens = TokenProvider::new(source, client.clone());
        Self {
            client,
            base_url,
            tokens,
        }
    }

    pub fn credential_kind(&self) -> &'static str {
        self.tokens.source().kind()
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), resource)
    }

    async fn post_json<B, T>(&self, resource: &str, body: &B) -> Result<T, ProviderError>
    where
        B: serde::Serialize + Sync,
        T: DeserializeOwned,
    {
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .post(self.url(resource))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        decode_response(response).await
    }

    async fn get_json<T>(&self, resource: &str) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .get(self.url(resource))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        decode_response(response).await
    }
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(parse_api_error(status.as_u16(), &text));
    }

    response
        .json()
        .await
        .map_err(|e| ProviderError::Parse(e.to_string()))
}

/// Turns a non-2xx body into `ProviderError::Api`, keeping the canonical
/// status code (`PERMISSION_DENIED`, ...) when the body carries one.
pub fn parse_api_error(http_status: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => ProviderError::Api {
            status: if envelope.error.code == 0 {
                http_status
            } else {
                envelope.error.code
            },
            code: envelope.error.status,
            message: envelope.error.message,
        },
        Err(_) => ProviderError::Api {
            status: http_status,
            code: None,
            message: body.trim().to_string(),
        },
    }
}

#[async_trait]
impl AnalyticsClient for DataApiClient {
    async fn run_report(&self, request: RunReportRequest) -> Result<ReportResponse, ProviderError> {
        let resource = format!("{}:runReport", request.property);
        self.post_json(&resource, &request).await
    }

    async fn run_realtime_report(
        &self,
        request: RunRealtimeReportRequest,
    ) -> Result<ReportResponse, ProviderError> {
        let resource = format!("{}:runRealtimeReport", request.property);
        self.post_json(&resource, &request).await
    }

    async fn get_metadata(&self, name: &str) -> Result<Metadata, ProviderError> {
        self.get_json(name).await
    }

    async fn close(&self) -> Result<(), ProviderError> {
        self.tokens.clear().await;
        Ok(())
    }
}

/// Builds `DataApiClient`s against one API base URL.
pub struct DataApiClientFactory {
    client: Client,
    base_url: String,
}

impl DataApiClientFactory {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, base_url }
    }
}

impl Default for DataApiClientFactory {
    fn default() -> Self {
        Self::new(DATA_API_BASE_URL.to_string())
    }
}

#[async_trait]
impl ClientFactory for DataApiClientFactory {
    async fn ambient(&self) -> Result<Arc<dyn AnalyticsClient>, ProviderError> {
        let source = discover_ambient().await?;
        tracing::info!("Ambient credentials resolved via {}", source.kind());
        Ok(Arc::new(DataApiClient::new(
            self.client.clone(),
            self.base_url.clone(),
            source,
        )))
    }

    fn with_access_token(
        &self,
        access_token: &str,
    ) -> Result<Arc<dyn AnalyticsClient>, ProviderError> {
        validate_access_token(access_token)?;
        Ok(Arc::new(DataApiClient::new(
            self.client.clone(),
            self.base_url.clone(),
            CredentialSource::AccessToken(access_token.to_string()),
        )))
    }
}
