//! Wire types for the GA4 Data API (`v1beta`), JSON mapping.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

/// Body of `properties/{id}:runReport`. `property` is the resource path and
/// travels in the URL, not the body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportRequest {
    #[serde(skip_serializing)]
    pub property: String,
    pub dimensions: Vec<Dimension>,
    pub metrics: Vec<Metric>,
    pub date_ranges: Vec<DateRange>,
    pub limit: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRealtimeReportRequest {
    #[serde(skip_serializing)]
    pub property: String,
    pub dimensions: Vec<Dimension>,
    pub metrics: Vec<Metric>,
    pub limit: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DimensionHeader {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MetricHeader {
    pub name: String,
    #[serde(rename = "type")]
    pub metric_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CellValue {
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Row {
    pub dimension_values: Vec<CellValue>,
    pub metric_values: Vec<CellValue>,
}

/// Shared shape of `RunReportResponse` and `RunRealtimeReportResponse`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportResponse {
    pub dimension_headers: Vec<DimensionHeader>,
    pub metric_headers: Vec<MetricHeader>,
    pub rows: Vec<Row>,
    pub totals: Vec<Row>,
    pub row_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DimensionMetadata {
    pub api_name: String,
    pub ui_name: String,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetricMetadata {
    pub api_name: String,
    pub ui_name: String,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub metric_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub name: String,
    pub dimensions: Vec<DimensionMetadata>,
    pub metrics: Vec<MetricMetadata>,
}

/// Error envelope returned by Google APIs.
#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorBody {
    pub code: u16,
    pub message: String,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_keeps_property_out_of_body() {
        let request = RunReportRequest {
            property: "properties/42".to_string(),
            dimensions: vec![Dimension { name: "country".into() }],
            metrics: vec![Metric { name: "activeUsers".into() }],
            date_ranges: vec![DateRange {
                start_date: "2024-01-01".into(),
                end_date: "2024-01-07".into(),
            }],
            limit: 5,
        };

        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("property").is_none());
        assert_eq!(body["dateRanges"][0]["startDate"], "2024-01-01");
        assert_eq!(body["metrics"][0]["name"], "activeUsers");
        assert_eq!(body["limit"], 5);
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let response: ReportResponse = serde_json::from_value(json!({
            "metricHeaders": [{"name": "sessions", "type": "TYPE_INTEGER"}],
            "rows": [{"metricValues": [{"value": "12"}]}],
            "kind": "analyticsData#runReport"
        }))
        .unwrap();

        assert!(response.dimension_headers.is_empty());
        assert_eq!(response.rows[0].metric_values[0].value, "12");
        assert!(response.rows[0].dimension_values.is_empty());
        assert_eq!(response.row_count, None);
        assert!(response.totals.is_empty());
    }

    #[test]
    fn test_metadata_parses_api_names() {
        let metadata: Metadata = serde_json::from_value(json!({
            "name": "properties/1/metadata",
            "metrics": [{
                "apiName": "sessions",
                "uiName": "Sessions",
                "description": "Number of sessions",
                "type": "TYPE_INTEGER",
                "category": "Session"
            }]
        }))
        .unwrap();

        assert!(metadata.dimensions.is_empty());
        assert_eq!(metadata.metrics[0].api_name, "sessions");
        assert_eq!(metadata.metrics[0].ui_name, "Sessions");
    }
}
