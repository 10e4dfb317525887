use chrono::Utc;
use colored::{control, Colorize};

use crate::core::formatter::{format_age, format_labels, format_value};
use crate::core::models::report::{FetchOutcome, MetricReport};
use crate::core::models::time_series::TimeSeries;
use crate::core::registry::MetricRegistry;

/// Series listed per metric before the rest are summarized.
const MAX_SERIES_LINES: usize = 10;

/// Render one fetch outcome as a colored (or plain) block.
///
/// Layout:
/// ```text
///  received_bytes_count (network)
///   Type     compute.googleapis.com/compute/instance/network/received_bytes_count
///   Series   2
///   Points   120
///     gce_instance instance_id=1, zone=us-central1-a   4.0 KiB (1m ago)
///     gce_instance instance_id=2, zone=us-central1-b   512 B (1m ago)
/// ```
pub fn render_outcome(outcome: &FetchOutcome, use_color: bool) -> String {
    control::set_override(use_color);

    match outcome {
        FetchOutcome::Report(report) => render_report(report),
        FetchOutcome::UnknownKey { key, message } => {
            let header = format!(" {} (error)", key);
            format!("{}\n  {}", header.bold(), message.red())
        }
    }
}

fn render_report(report: &MetricReport) -> String {
    let mut lines: Vec<String> = Vec::new();

    let header = format!(" {} ({})", report.name, report.key);
    lines.push(header.bold().to_string());
    lines.push(format!("  {}     {}", "Type".cyan(), report.metric_type.dimmed()));

    if let Some(failure) = &report.failure {
        lines.push(format!("  {}   {}", "Failed".cyan(), failure.to_string().red()));
        return lines.join("\n");
    }

    lines.push(format!("  {}   {}", "Series".cyan(), report.series.len()));
    lines.push(format!("  {}   {}", "Points".cyan(), report.point_count()));

    if report.series.is_empty() {
        lines.push(format!("  {}", "No data in the last hour".dimmed()));
        return lines.join("\n");
    }

    for series in report.series.iter().take(MAX_SERIES_LINES) {
        lines.push(format!("    {}", render_series_line(series)));
    }
    if report.series.len() > MAX_SERIES_LINES {
        let rest = report.series.len() - MAX_SERIES_LINES;
        lines.push(format!("    {}", format!("… and {} more", rest).dimmed()));
    }

    lines.join("\n")
}

fn render_series_line(series: &TimeSeries) -> String {
    let resource = format!(
        "{} {}",
        series.resource.resource_type,
        format_labels(&series.resource.labels)
    );
    let latest = match series.latest() {
        Some(point) => format!(
            "{} {}",
            format_value(&point.value, series.unit.as_deref()).green(),
            format!("({})", format_age(&point.interval.end_time, Utc::now())).dimmed()
        ),
        None => "no points".dimmed().to_string(),
    };
    format!("{}   {}", resource, latest)
}

/// Key → type listing for `kpi registries`.
pub fn render_registry(registry: &MetricRegistry, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines = vec![format!(" {}", registry.name).bold().to_string()];
    let width = registry.keys().map(str::len).max().unwrap_or(0);
    for entry in &registry.metrics {
        let padded = format!("{:<width$}", entry.key, width = width);
        lines.push(format!("  {}  {}", padded.cyan(), entry.metric_type));
    }
    lines.join("\n")
}
