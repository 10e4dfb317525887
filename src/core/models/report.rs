use serde_json::{json, Map, Value};

use crate::core::models::time_series::TimeSeries;
use crate::core::monitoring::BackendError;

/// Data retrieved for one recognized metric key.
#[derive(Debug)]
pub struct MetricReport {
    pub key: String,
    pub metric_type: String,
    /// Last path segment of `metric_type`; the key results are published under.
    pub name: String,
    pub series: Vec<TimeSeries>,
    /// Set when the backend call failed; `series` is then empty.
    pub failure: Option<BackendError>,
}

impl MetricReport {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    Report(MetricReport),
    UnknownKey { key: String, message: String },
}

impl FetchOutcome {
    pub fn unknown_key(key: &str) -> Self {
        Self::UnknownKey {
            key: key.to_string(),
            message: format!("Metric type for key '{}' not found.", key),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Report(r) => &r.key,
            Self::UnknownKey { key, .. } => key,
        }
    }

    pub fn report(&self) -> Option<&MetricReport> {
        match self {
            Self::Report(r) => Some(r),
            Self::UnknownKey { .. } => None,
        }
    }

    /// `{"<name>": [series...]}` or `{"error": "<message>"}`.
    ///
    /// With `include_failure`, a failed report also carries `"failure"`.
    pub fn to_json(&self, include_failure: bool) -> Result<Value, serde_json::Error> {
        match self {
            Self::Report(report) => {
                let mut map = Map::new();
                map.insert(report.name.clone(), serde_json::to_value(&report.series)?);
                if include_failure {
                    if let Some(failure) = &report.failure {
                        map.insert("failure".to_string(), json!(failure.to_string()));
                    }
                }
                Ok(Value::Object(map))
            }
            Self::UnknownKey { message, .. } => Ok(json!({ "error": message })),
        }
    }
}
