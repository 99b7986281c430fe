use crate::errors::{ErrorKind, ErrorPayload};
use crate::registry::ToolRegistry;
use crate::render::{render_metadata, render_table};
use crate::sideband::SidebandCredentials;
use crate::traits::{Tool, ToolResult};
use async_trait::async_trait;
use ga4_mcp_core::{AnalyticsAdapter, DateRangeSpec, RealtimeRequestSpec, ReportRequestSpec};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub const DEFAULT_ROW_LIMIT: u64 = 10;

fn default_limit() -> u64 {
    DEFAULT_ROW_LIMIT
}

fn default_metadata_type() -> String {
    "all".to_string()
}

fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ErrorPayload> {
    // Clients may omit `arguments` entirely.
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args).map_err(|e| {
        tracing::warn!("Invalid arguments for {}: {}", tool, e);
        ErrorPayload::new(ErrorKind::ValueError, format!("Invalid arguments: {}", e))
    })
}

fn kwargs_schema() -> Value {
    json!({
        "type": "object",
        "description": "Optional caller credentials",
        "properties": {
            "access_token": {
                "type": "string",
                "description": "OAuth access token to run the call as a specific user"
            },
            "user_email": {
                "type": "string",
                "description": "Identity hint, used for logging only"
            }
        }
    })
}

fn string_list_schema(description: &str) -> Value {
    json!({
        "type": "array",
        "items": {"type": "string"},
        "description": description
    })
}

#[derive(Debug, Deserialize)]
struct RunReportArgs {
    metrics: Vec<String>,
    #[serde(default)]
    dimensions: Option<Vec<String>>,
    #[serde(default)]
    date_range: Option<DateRangeSpec>,
    #[serde(default)]
    property_id: Option<String>,
    #[serde(default = "default_limit")]
    limit: u64,
    #[serde(default)]
    kwargs: Option<SidebandCredentials>,
}

#[derive(Debug, Deserialize)]
struct RunRealtimeReportArgs {
    metrics: Vec<String>,
    #[serde(default)]
    dimensions: Option<Vec<String>>,
    #[serde(default)]
    property_id: Option<String>,
    #[serde(default = "default_limit")]
    limit: u64,
    #[serde(default)]
    kwargs: Option<SidebandCredentials>,
}

#[derive(Debug, Deserialize)]
struct GetMetadataArgs {
    #[serde(rename = "type", default = "default_metadata_type")]
    metadata_type: String,
    #[serde(default)]
    property_id: Option<String>,
    #[serde(default)]
    kwargs: Option<SidebandCredentials>,
}

pub struct RunReportTool {
    adapter: Arc<AnalyticsAdapter>,
}

impl RunReportTool {
    pub fn new(adapter: Arc<AnalyticsAdapter>) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl Tool for RunReportTool {
    fn name(&self) -> &str {
        "run_report"
    }

    fn description(&self) -> &str {
        "Run a standard GA4 report with configurable metrics, dimensions, and date ranges"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "metrics": string_list_schema("Metric names, e.g. [\"activeUsers\", \"sessions\"]"),
                "dimensions": string_list_schema("Dimension names, e.g. [\"date\", \"country\"]"),
                "date_range": {
                    "description": "One of today, yesterday, last7days, last30days, or {start_date, end_date} in YYYY-MM-DD",
                    "default": "last30days",
                    "oneOf": [
                        {"type": "string", "enum": ["today", "yesterday", "last7days", "last30days"]},
                        {
                            "type": "object",
                            "properties": {
                                "start_date": {"type": "string"},
                                "end_date": {"type": "string"}
                            },
                            "required": ["start_date", "end_date"]
                        }
                    ]
                },
                "property_id": {
                    "type": "string",
                    "description": "GA4 property ID (overrides the default)"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 0,
                    "default": DEFAULT_ROW_LIMIT,
                    "description": "Number of rows to return"
                },
                "kwargs": kwargs_schema()
            },
            "required": ["metrics"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let args: RunReportArgs = match parse_args(self.name(), args) {
            Ok(args) => args,
            Err(payload) => return ToolResult::Error(payload),
        };
        let sideband = args.kwargs.unwrap_or_default();
        let date_range = args.date_range.unwrap_or_default();

        tracing::info!(
            "Running report with metrics={:?}, dimensions={:?}, date_range={:?}, limit={} for {}",
            args.metrics,
            args.dimensions,
            date_range,
            args.limit,
            sideband.user_label()
        );

        let spec = ReportRequestSpec {
            property_id: args.property_id,
            metric_names: args.metrics,
            dimension_names: args.dimensions.unwrap_or_default(),
            date_range,
            row_limit: args.limit,
            credential: sideband.credential(),
        };

        match self.adapter.run_report(spec).await {
            Ok(result) => ToolResult::Text(render_table(&result)),
            Err(e) => ToolResult::Error(ErrorPayload::from_adapter_error("running report", &e)),
        }
    }
}

pub struct RunRealtimeReportTool {
    adapter: Arc<AnalyticsAdapter>,
}

impl RunRealtimeReportTool {
    pub fn new(adapter: Arc<AnalyticsAdapter>) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl Tool for RunRealtimeReportTool {
    fn name(&self) -> &str {
        "run_realtime_report"
    }

    fn description(&self) -> &str {
        "Get real-time GA4 data for the past 30 minutes"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "metrics": string_list_schema("Metric names, e.g. [\"activeUsers\", \"screenPageViews\"]"),
                "dimensions": string_list_schema("Dimension names, e.g. [\"country\", \"city\"]"),
                "property_id": {
                    "type": "string",
                    "description": "GA4 property ID (overrides the default)"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 0,
                    "default": DEFAULT_ROW_LIMIT,
                    "description": "Number of rows to return"
                },
                "kwargs": kwargs_schema()
            },
            "required": ["metrics"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let args: RunRealtimeReportArgs = match parse_args(self.name(), args) {
            Ok(args) => args,
            Err(payload) => return ToolResult::Error(payload),
        };
        let sideband = args.kwargs.unwrap_or_default();

        tracing::info!(
            "Running realtime report with metrics={:?}, dimensions={:?}, limit={} for {}",
            args.metrics,
            args.dimensions,
            args.limit,
            sideband.user_label()
        );

        let spec = RealtimeRequestSpec {
            property_id: args.property_id,
            metric_names: args.metrics,
            dimension_names: args.dimensions.unwrap_or_default(),
            row_limit: args.limit,
            credential: sideband.credential(),
        };

        match self.adapter.run_realtime_report(spec).await {
            Ok(result) => ToolResult::Text(render_table(&result)),
            Err(e) => ToolResult::Error(ErrorPayload::from_adapter_error(
                "running realtime report",
                &e,
            )),
        }
    }
}

pub struct GetMetadataTool {
    adapter: Arc<AnalyticsAdapter>,
}

impl GetMetadataTool {
    pub fn new(adapter: Arc<AnalyticsAdapter>) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl Tool for GetMetadataTool {
    fn name(&self) -> &str {
        "get_metadata"
    }

    fn description(&self) -> &str {
        "Retrieve available metrics and dimensions for a GA4 property"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "type": {
                    "type": "string",
                    "enum": ["metrics", "dimensions", "all"],
                    "default": "all",
                    "description": "Type of metadata to retrieve"
                },
                "property_id": {
                    "type": "string",
                    "description": "GA4 property ID (overrides the default)"
                },
                "kwargs": kwargs_schema()
            }
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let args: GetMetadataArgs = match parse_args(self.name(), args) {
            Ok(args) => args,
            Err(payload) => return ToolResult::Error(payload),
        };
        let sideband = args.kwargs.unwrap_or_default();

        tracing::info!(
            "Getting metadata type={} for {}",
            args.metadata_type,
            sideband.user_label()
        );

        let result = self
            .adapter
            .get_metadata(
                args.property_id.as_deref(),
                &args.metadata_type,
                &sideband.credential(),
            )
            .await;

        match result {
            Ok(metadata) => ToolResult::Text(render_metadata(&metadata)),
            Err(e) => ToolResult::Error(ErrorPayload::from_adapter_error("getting metadata", &e)),
        }
    }
}

/// Registry holding the three analytics tools over one shared adapter.
pub fn analytics_tools(adapter: Arc<AnalyticsAdapter>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(RunReportTool::new(adapter.clone())));
    registry.register(Arc::new(RunRealtimeReportTool::new(adapter.clone())));
    registry.register(Arc::new(GetMetadataTool::new(adapter)));
    registry
}
