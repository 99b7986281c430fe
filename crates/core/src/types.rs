use crate::error::AdapterError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Which identity a call runs under.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialRef {
    Ambient,
    Token(String),
}

impl CredentialRef {
    /// Empty or absent tokens fall back to the ambient identity.
    pub fn from_access_token(access_token: Option<&str>) -> Self {
        match access_token {
            Some(token) if !token.is_empty() => CredentialRef::Token(token.to_string()),
            _ => CredentialRef::Ambient,
        }
    }

    pub fn is_ambient(&self) -> bool {
        matches!(self, CredentialRef::Ambient)
    }
}

impl fmt::Debug for CredentialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialRef::Ambient => f.write_str("Ambient"),
            CredentialRef::Token(_) => f.write_str("Token(<redacted>)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateRangeSpec {
    Alias(String),
    Explicit {
        #[serde(default)]
        start_date: Option<String>,
        #[serde(default)]
        end_date: Option<String>,
    },
}

impl Default for DateRangeSpec {
    fn default() -> Self {
        DateRangeSpec::Alias("last30days".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDateRange {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone)]
pub struct ReportRequestSpec {
    pub property_id: Option<String>,
    pub metric_names: Vec<String>,
    pub dimension_names: Vec<String>,
    pub date_range: DateRangeSpec,
    pub row_limit: u64,
    pub credential: CredentialRef,
}

#[derive(Debug, Clone)]
pub struct RealtimeRequestSpec {
    pub property_id: Option<String>,
    pub metric_names: Vec<String>,
    pub dimension_names: Vec<String>,
    pub row_limit: u64,
    pub credential: CredentialRef,
}

pub type TabularRow = BTreeMap<String, String>;

/// A report flattened into named columns. Every row carries exactly the
/// dimension and metric columns as keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabularResult {
    pub dimension_columns: Vec<String>,
    pub metric_columns: Vec<String>,
    pub rows: Vec<TabularRow>,
    /// Provider-reported total when present, otherwise `rows.len()`.
    pub row_count: u64,
    pub totals: Vec<TabularRow>,
}

impl TabularResult {
    pub fn columns(&self) -> impl Iterator<Item = &String> {
        self.dimension_columns.iter().chain(self.metric_columns.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataType {
    Metrics,
    Dimensions,
    All,
}

impl MetadataType {
    pub fn includes_metrics(self) -> bool {
        matches!(self, MetadataType::Metrics | MetadataType::All)
    }

    pub fn includes_dimensions(self) -> bool {
        matches!(self, MetadataType::Dimensions | MetadataType::All)
    }
}

impl FromStr for MetadataType {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metrics" => Ok(MetadataType::Metrics),
            "dimensions" => Ok(MetadataType::Dimensions),
            "all" => Ok(MetadataType::All),
            other => Err(AdapterError::Validation(format!(
                "Invalid metadata type: {}. Valid types: metrics, dimensions, all",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<MetadataEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Vec<MetadataEntry>>,
}
