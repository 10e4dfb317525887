use serde::{Deserialize, Serialize};

/// One short key and the fully-qualified metric type it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricEntry {
    pub key: String,
    #[serde(rename = "type")]
    pub metric_type: String,
}

/// Ordered, immutable mapping from short metric keys to metric types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRegistry {
    pub name: String,
    #[serde(default)]
    pub metrics: Vec<MetricEntry>,
}

impl MetricRegistry {
    pub fn new(name: &str, entries: &[(&str, &str)]) -> Self {
        Self {
            name: name.to_string(),
            metrics: entries
                .iter()
                .map(|(key, metric_type)| MetricEntry {
                    key: key.to_string(),
                    metric_type: metric_type.to_string(),
                })
                .collect(),
        }
    }

    /// Application and network oriented metrics.
    pub fn application() -> Self {
        Self::new(
            "application",
            &[
                (
                    "network",
                    "compute.googleapis.com/compute/instance/network/received_bytes_count",
                ),
                (
                    "error_rate",
                    "cloudfunctions.googleapis.com/function/execution_count",
                ),
                ("latency", "cloudfunctions.googleapis.com/function/latency"),
                ("uptime", "compute.googleapis.com/instance/disk/uptime"),
            ],
        )
    }

    /// Instance resource metrics.
    pub fn infrastructure() -> Self {
        Self::new(
            "infrastructure",
            &[
                (
                    "cpu",
                    "compute.googleapis.com/instance/disk/write_bytes_count",
                ),
                (
                    "memory",
                    "compute.googleapis.com/instance/memory/balloon/ram_used",
                ),
                (
                    "disk_io",
                    "compute.googleapis.com/instance/disk/read_bytes_count",
                ),
            ],
        )
    }

    /// Built-in registries in run order.
    pub fn builtin() -> Vec<Self> {
        vec![Self::application(), Self::infrastructure()]
    }

    /// Exact, case-sensitive lookup.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.metrics
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.metric_type.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.resolve(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|m| m.key.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

/// The name a result is reported under: the last `/`-delimited segment of the type.
pub fn metric_name(metric_type: &str) -> &str {
    metric_type.rsplit('/').next().unwrap_or(metric_type)
}
