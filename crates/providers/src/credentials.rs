//! Credential sources: caller-supplied bearer tokens and application default
//! credentials (ADC) discovered from the environment.

use crate::constants::*;
use crate::traits::ProviderError;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::header::HeaderValue;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Contents of an ADC JSON file.
#[derive(Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialsFile {
    AuthorizedUser {
        client_id: String,
        client_secret: String,
        refresh_token: String,
        #[serde(default = "default_token_uri")]
        token_uri: String,
    },
    ServiceAccount {
        client_email: String,
        private_key: String,
        #[serde(default = "default_token_uri")]
        token_uri: String,
    },
}

#[derive(Clone)]
pub enum CredentialSource {
    AccessToken(String),
    File(CredentialsFile),
    MetadataServer,
}

impl CredentialSource {
    pub fn kind(&self) -> &'static str {
        match self {
            CredentialSource::AccessToken(_) => "access_token",
            CredentialSource::File(CredentialsFile::AuthorizedUser { .. }) => "authorized_user",
            CredentialSource::File(CredentialsFile::ServiceAccount { .. }) => "service_account",
            CredentialSource::MetadataServer => "metadata_server",
        }
    }
}

// Secrets never reach the logs.
impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CredentialSource").field(&self.kind()).finish()
    }
}

/// Rejects tokens that cannot travel in an `Authorization` header.
pub fn validate_access_token(access_token: &str) -> Result<(), ProviderError> {
    if access_token.trim().is_empty() {
        return Err(ProviderError::Credential("Access token is empty".to_string()));
    }
    if access_token.trim() != access_token {
        return Err(ProviderError::Credential(
            "Access token has leading or trailing whitespace".to_string(),
        ));
    }
    HeaderValue::from_str(&format!("Bearer {}", access_token)).map_err(|_| {
        ProviderError::Credential("Access token is not a valid bearer token".to_string())
    })?;
    Ok(())
}

fn well_known_path() -> Option<PathBuf> {
    if cfg!(windows) {
        std::env::var_os("APPDATA")
            .map(|appdata| PathBuf::from(appdata).join("gcloud/application_default_credentials.json"))
    } else {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(WELL_KNOWN_CREDENTIALS))
    }
}

pub async fn load_credentials_file(path: &Path) -> Result<CredentialsFile, ProviderError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        ProviderError::Credential(format!(
            "Failed to read credentials file {}: {}",
            path.display(),
            e
        ))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        ProviderError::Credential(format!(
            "Unsupported or malformed credentials file {}: {}",
            path.display(),
            e
        ))
    })
}

/// Resolves the ambient identity: explicit credentials file, then the gcloud
/// well-known file, then the metadata server.
pub async fn discover_ambient() -> Result<CredentialSource, ProviderError> {
    if let Some(path) = std::env::var_os(CREDENTIALS_ENV).filter(|p| !p.is_empty()) {
        let path = PathBuf::from(path);
        tracing::debug!("Loading credentials from {}", path.display());
        return load_credentials_file(&path).await.map(CredentialSource::File);
    }

    if let Some(path) = well_known_path() {
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!("Loading gcloud credentials from {}", path.display());
            return load_credentials_file(&path).await.map(CredentialSource::File);
        }
    }

    tracing::debug!("No credentials file found, falling back to metadata server");
    Ok(CredentialSource::MetadataServer)
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

fn is_token_expired(token: &CachedToken, now: i64) -> bool {
    now + TOKEN_EXPIRY_SKEW_SECS >= token.expires_at
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

fn sign_jwt_assertion(
    client_email: &str,
    private_key: &str,
    token_uri: &str,
    now: i64,
) -> Result<String, ProviderError> {
    let key = EncodingKey::from_rsa_pem(private_key.as_bytes())
        .map_err(|e| ProviderError::Credential(format!("Invalid service account key: {}", e)))?;

    let claims = JwtClaims {
        iss: client_email,
        scope: ANALYTICS_READONLY_SCOPE,
        aud: token_uri,
        iat: now,
        exp: now + JWT_LIFETIME_SECS,
    };

    encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| ProviderError::Credential(format!("Failed to sign JWT assertion: {}", e)))
}

/// Hands out bearer tokens for one credential source, refreshing cached
/// tokens shortly before they expire.
pub struct TokenProvider {
    source: CredentialSource,
    http: Client,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(source: CredentialSource, http: Client) -> Self {
        Self {
            source,
            http,
            cached: RwLock::new(None),
        }
    }

    pub fn source(&self) -> &CredentialSource {
        &self.source
    }

    pub async fn access_token(&self) -> Result<String, ProviderError> {
        if let CredentialSource::AccessToken(token) = &self.source {
            return Ok(token.clone());
        }

        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref() {
                if !is_token_expired(token, Utc::now().timestamp()) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let mut cached = self.cached.write().await;
        // Another task may have refreshed while we waited for the write lock.
        if let Some(token) = cached.as_ref() {
            if !is_token_expired(token, Utc::now().timestamp()) {
                return Ok(token.access_token.clone());
            }
        }

        tracing::debug!("Fetching access token via {}", self.source.kind());
        let fresh = self.fetch_token().await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    pub async fn clear(&self) {
        *self.cached.write().await = None;
    }

    async fn fetch_token(&self) -> Result<CachedToken, ProviderError> {
        match &self.source {
            CredentialSource::AccessToken(token) => Ok(CachedToken {
                access_token: token.clone(),
                expires_at: i64::MAX,
            }),
            CredentialSource::File(CredentialsFile::AuthorizedUser {
                client_id,
                client_secret,
                refresh_token,
                token_uri,
            }) => {
                let params = [
                    ("grant_type", "refresh_token"),
                    ("client_id", client_id.as_str()),
                    ("client_secret", client_secret.as_str()),
                    ("refresh_token", refresh_token.as_str()),
                ];
                self.request_token(self.http.post(token_uri).form(&params))
                    .await
            }
            CredentialSource::File(CredentialsFile::ServiceAccount {
                client_email,
                private_key,
                token_uri,
            }) => {
                let assertion = sign_jwt_assertion(
                    client_email,
                    private_key,
                    token_uri,
                    Utc::now().timestamp(),
                )?;
                let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];
                self.request_token(self.http.post(token_uri).form(&params))
                    .await
            }
            CredentialSource::MetadataServer => {
                self.request_token(
                    self.http
                        .get(METADATA_TOKEN_URL)
                        .header(HEADER_METADATA_FLAVOR, VALUE_METADATA_FLAVOR),
                )
                .await
            }
        }
    }

    async fn request_token(&self, request: RequestBuilder) -> Result<CachedToken, ProviderError> {
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Http(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(token_endpoint_error(status, &text));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Invalid token response: {}", e)))?;

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: Utc::now().timestamp() + token.expires_in.unwrap_or(JWT_LIFETIME_SECS),
        })
    }
}

/// Only a rejected grant means the credentials are bad; outages and rate
/// limits stay plain API errors.
fn token_endpoint_error(status: u16, body: &str) -> ProviderError {
    let code = matches!(status, 400 | 401 | 403).then(|| "UNAUTHENTICATED".to_string());
    ProviderError::Api {
        status,
        code,
        message: format!("Token endpoint returned {}: {}", status, body),
    }
}
