use crate::types::{MetadataEntry, MetadataResult, MetadataType, TabularResult, TabularRow};
use ga4_mcp_providers::types::{CellValue, Metadata, ReportResponse};

fn zip_values(headers: &[String], values: &[CellValue], row: &mut TabularRow) {
    for (i, header) in headers.iter().enumerate() {
        let value = values.get(i).map(|v| v.value.clone()).unwrap_or_default();
        row.insert(header.clone(), value);
    }
}

/// Zips header names with positional row values.
///
/// `row_count` is taken from the response when the provider reports one and
/// is deliberately not reconciled with `rows.len()`: sampled or truncated
/// responses report the full count. Totals only carry metric columns.
pub fn flatten_response(response: &ReportResponse) -> TabularResult {
    let dimension_columns: Vec<String> = response
        .dimension_headers
        .iter()
        .map(|h| h.name.clone())
        .collect();
    let metric_columns: Vec<String> = response
        .metric_headers
        .iter()
        .map(|h| h.name.clone())
        .collect();

    let rows: Vec<TabularRow> = response
        .rows
        .iter()
        .map(|row| {
            let mut flat = TabularRow::new();
            zip_values(&dimension_columns, &row.dimension_values, &mut flat);
            zip_values(&metric_columns, &row.metric_values, &mut flat);
            flat
        })
        .collect();

    let totals = response
        .totals
        .iter()
        .map(|total| {
            total
                .metric_values
                .iter()
                .zip(metric_columns.iter())
                .map(|(value, header)| (header.clone(), value.value.clone()))
                .collect::<TabularRow>()
        })
        .filter(|total| !total.is_empty())
        .collect();

    let row_count = response.row_count.unwrap_or(rows.len() as u64);

    TabularResult {
        dimension_columns,
        metric_columns,
        rows,
        row_count,
        totals,
    }
}

pub fn filter_metadata(metadata: &Metadata, metadata_type: MetadataType) -> MetadataResult {
    let metrics = metadata_type.includes_metrics().then(|| {
        metadata
            .metrics
            .iter()
            .map(|m| MetadataEntry {
                name: m.api_name.clone(),
                display_name: m.ui_name.clone(),
                description: m.description.clone(),
                category: m.category.clone(),
            })
            .collect()
    });

    let dimensions = metadata_type.includes_dimensions().then(|| {
        metadata
            .dimensions
            .iter()
            .map(|d| MetadataEntry {
                name: d.api_name.clone(),
                display_name: d.ui_name.clone(),
                description: d.description.clone(),
                category: d.category.clone(),
            })
            .collect()
    });

    MetadataResult {
        metrics,
        dimensions,
    }
}
