use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::core::models::time_series::TypedValue;

/// Compact magnitude: "950", "12.3K", "4.1M", "2.0G".
pub fn format_magnitude(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000_000.0 {
        format!("{:.1}G", value / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.3}", value)
    }
}

/// Render a sample with its unit. Ratios (unit "1") render as percentages.
pub fn format_value(value: &TypedValue, unit: Option<&str>) -> String {
    match value {
        TypedValue::BoolValue(b) => b.to_string(),
        TypedValue::StringValue(s) => s.clone(),
        TypedValue::DistributionValue(d) => {
            format!("mean {} (n={})", format_magnitude(d.mean), d.count)
        }
        TypedValue::Int64Value(_) | TypedValue::DoubleValue(_) => {
            let v = value.as_f64().unwrap_or_default();
            match unit {
                Some("1") => format!("{:.1}%", v * 100.0),
                Some("By") => format_bytes(v),
                Some(u) if !u.is_empty() => format!("{} {}", format_magnitude(v), u),
                _ => format_magnitude(v),
            }
        }
    }
}

/// Binary byte sizes: "512 B", "4.0 KiB", "1.5 MiB".
pub fn format_bytes(bytes: f64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes;
    let mut unit = 0;
    while size.abs() >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", size as i64)
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

/// "just now", "42s ago", "5m ago", "1h 10m ago" relative to `now`.
pub fn format_age(at: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - *at).num_seconds();
    if secs <= 0 {
        return "just now".to_string();
    }
    let minutes = secs / 60;
    let hours = minutes / 60;
    if hours > 0 {
        format!("{}h {}m ago", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m ago", minutes)
    } else {
        format!("{}s ago", secs)
    }
}

/// "k1=v1, k2=v2" in key order; empty maps render as "-".
pub fn format_labels(labels: &BTreeMap<String, String>) -> String {
    if labels.is_empty() {
        return "-".to_string();
    }
    labels
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}
