use ga4_mcp_core::{MetadataEntry, MetadataResult, TabularResult};

pub const NO_DATA: &str = "No data returned.";
pub const TOTALS_MARKER: &str = "TOTALS";

fn pipe_row<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    format!("| {} |", cells.collect::<Vec<_>>().join(" | "))
}

/// Markdown table: dimension columns first, then metrics, then an optional
/// totals block.
pub fn render_table(result: &TabularResult) -> String {
    if result.rows.is_empty() {
        return NO_DATA.to_string();
    }

    let columns: Vec<&str> = result.columns().map(String::as_str).collect();
    let header = pipe_row(columns.iter().copied());
    let separator = pipe_row(columns.iter().map(|_| "---"));

    let mut lines = vec![header.clone(), separator.clone()];
    for row in &result.rows {
        lines.push(pipe_row(
            columns
                .iter()
                .map(|column| row.get(*column).map(String::as_str).unwrap_or("")),
        ));
    }

    if !result.totals.is_empty() {
        lines.push(String::new());
        lines.push("**Totals:**".to_string());
        lines.push(header);
        lines.push(separator);
        for total in &result.totals {
            let dimension_slots = (0..result.dimension_columns.len())
                .map(|i| if i == 0 { TOTALS_MARKER } else { "" });
            let metric_slots = result
                .metric_columns
                .iter()
                .map(|column| total.get(column).map(String::as_str).unwrap_or(""));
            lines.push(pipe_row(dimension_slots.chain(metric_slots)));
        }
    }

    lines.join("\n")
}

fn push_section(lines: &mut Vec<String>, heading: &str, entries: &[MetadataEntry]) {
    lines.push(format!("{}\n", heading));
    for entry in entries {
        lines.push(format!("- **{}**: {}", entry.name, entry.display_name));
        if !entry.description.is_empty() {
            lines.push(format!("  - {}", entry.description));
        }
        lines.push(format!("  - Category: {}", entry.category));
        lines.push(String::new());
    }
}

pub fn render_metadata(result: &MetadataResult) -> String {
    let mut lines = Vec::new();
    if let Some(metrics) = &result.metrics {
        push_section(&mut lines, "# Available Metrics", metrics);
    }
    if let Some(dimensions) = &result.dimensions {
        push_section(&mut lines, "# Available Dimensions", dimensions);
    }
    lines.join("\n")
}
