// GA4 Data API
pub const DATA_API_BASE_URL: &str = "https://analyticsdata.googleapis.com/v1beta";
pub const ANALYTICS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";

// OAuth
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
pub const JWT_LIFETIME_SECS: i64 = 3600;
pub const TOKEN_EXPIRY_SKEW_SECS: i64 = 60;

// Application default credentials
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const WELL_KNOWN_CREDENTIALS: &str = ".config/gcloud/application_default_credentials.json";

// Metadata server
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
pub const HEADER_METADATA_FLAVOR: &str = "Metadata-Flavor";
pub const VALUE_METADATA_FLAVOR: &str = "Google";

pub const USER_AGENT: &str = concat!("ga4-mcp/", env!("CARGO_PKG_VERSION"));
