use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Metric descriptor attached to a series: the type plus its label values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(rename = "type", default)]
    pub metric_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// The monitored resource (e.g. `gce_instance`) a series was written against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitoredResource {
    #[serde(rename = "type", default)]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointInterval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    #[serde(
        default,
        deserialize_with = "int64_string",
        serialize_with = "int64_as_string"
    )]
    pub count: i64,
    #[serde(default)]
    pub mean: f64,
    #[serde(default)]
    pub sum_of_squared_deviation: f64,
    /// Buckets, range and exemplars, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single typed sample. The API encodes exactly one of these fields per value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypedValue {
    BoolValue(bool),
    Int64Value(
        #[serde(deserialize_with = "int64_string", serialize_with = "int64_as_string")] i64,
    ),
    DoubleValue(f64),
    StringValue(String),
    DistributionValue(Distribution),
}

impl TypedValue {
    /// Numeric view of the value; distributions report their mean.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::BoolValue(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Int64Value(v) => Some(*v as f64),
            Self::DoubleValue(v) => Some(*v),
            Self::StringValue(_) => None,
            Self::DistributionValue(d) => Some(d.mean),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub interval: PointInterval,
    pub value: TypedValue,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One series as returned by `projects.timeSeries.list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    #[serde(default)]
    pub metric: Metric,
    #[serde(default)]
    pub resource: MonitoredResource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Newest first, as the API returns them.
    #[serde(default)]
    pub points: Vec<Point>,
    /// Fields not modelled above (`metadata`, `description`, ...), kept as returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TimeSeries {
    pub fn latest(&self) -> Option<&Point> {
        self.points.iter().max_by_key(|p| p.interval.end_time)
    }
}

/// Write int64 fields back the way the API encodes them.
fn int64_as_string<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(value)
}

/// int64 fields arrive as JSON strings; accept plain numbers too.
fn int64_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(i64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
        Raw::Num(n) => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_int64_series() {
        let json = r#"{
            "metric": {
                "type": "compute.googleapis.com/instance/disk/write_bytes_count",
                "labels": { "device_name": "disk-1", "storage_type": "pd-balanced" }
            },
            "resource": {
                "type": "gce_instance",
                "labels": { "instance_id": "123", "zone": "us-central1-a" }
            },
            "metricKind": "DELTA",
            "valueType": "INT64",
            "unit": "By",
            "points": [
                {
                    "interval": { "startTime": "2026-10-16T09:59:00Z", "endTime": "2026-10-16T10:00:00Z" },
                    "value": { "int64Value": "4096" }
                },
                {
                    "interval": { "startTime": "2026-10-16T09:58:00Z", "endTime": "2026-10-16T09:59:00Z" },
                    "value": { "int64Value": "1024" }
                }
            ]
        }"#;
        let series: TimeSeries = serde_json::from_str(json).unwrap();
        assert_eq!(series.resource.resource_type, "gce_instance");
        assert_eq!(series.metric.labels["device_name"], "disk-1");
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].value, TypedValue::Int64Value(4096));
        assert_eq!(series.unit.as_deref(), Some("By"));
    }

    #[test]
    fn deserialize_gauge_double_without_start_time() {
        let json = r#"{
            "metric": { "type": "compute.googleapis.com/instance/cpu/utilization" },
            "resource": { "type": "gce_instance" },
            "points": [
                { "interval": { "endTime": "2026-10-16T10:00:00Z" }, "value": { "doubleValue": 0.42 } }
            ]
        }"#;
        let series: TimeSeries = serde_json::from_str(json).unwrap();
        let point = &series.points[0];
        assert!(point.interval.start_time.is_none());
        assert!((point.value.as_f64().unwrap() - 0.42).abs() < 1e-10);
    }

    #[test]
    fn deserialize_distribution_value() {
        let json = r#"{ "distributionValue": { "count": "12", "mean": 250.5 } }"#;
        let value: TypedValue = serde_json::from_str(json).unwrap();
        match &value {
            TypedValue::DistributionValue(d) => {
                assert_eq!(d.count, 12);
                assert!((d.sum_of_squared_deviation - 0.0).abs() < 1e-10);
            }
            other => panic!("expected distribution, got {:?}", other),
        }
        assert!((value.as_f64().unwrap() - 250.5).abs() < 1e-10);
    }

    #[test]
    fn distribution_series_survives_reencoding() {
        let raw = serde_json::json!({
            "metric": { "type": "cloudfunctions.googleapis.com/function/latency" },
            "resource": { "type": "cloud_function", "labels": { "function_name": "ingest" } },
            "metadata": { "systemLabels": { "region": "us-central1" } },
            "description": "execution times",
            "metricKind": "DELTA",
            "valueType": "DISTRIBUTION",
            "unit": "ms",
            "points": [{
                "interval": { "startTime": "2026-10-16T09:59:00Z", "endTime": "2026-10-16T10:00:00Z" },
                "value": {
                    "distributionValue": {
                        "count": "3",
                        "mean": 12.5,
                        "sumOfSquaredDeviation": 4.5,
                        "range": { "min": 10.0, "max": 15.0 },
                        "bucketOptions": { "exponentialBuckets": { "numFiniteBuckets": 2, "growthFactor": 2.0, "scale": 10.0 } },
                        "bucketCounts": ["0", "2", "1"],
                        "exemplars": [{ "value": 15.0, "timestamp": "2026-10-16T09:59:30Z" }]
                    }
                }
            }]
        });

        let series: TimeSeries = serde_json::from_value(raw.clone()).unwrap();
        match &series.points[0].value {
            TypedValue::DistributionValue(d) => assert_eq!(d.count, 3),
            other => panic!("expected distribution, got {:?}", other),
        }

        let encoded = serde_json::to_value(&series).unwrap();
        assert_eq!(encoded["metadata"], raw["metadata"]);
        assert_eq!(encoded["description"], raw["description"]);
        assert_eq!(encoded["points"][0]["value"], raw["points"][0]["value"]);
        assert_eq!(encoded["resource"], raw["resource"]);
    }

    #[test]
    fn int64_value_written_back_as_string() {
        let encoded = serde_json::to_value(TypedValue::Int64Value(4096)).unwrap();
        assert_eq!(encoded, serde_json::json!({ "int64Value": "4096" }));
    }

    #[test]
    fn int64_accepts_plain_number() {
        let value: TypedValue = serde_json::from_str(r#"{ "int64Value": 7 }"#).unwrap();
        assert_eq!(value, TypedValue::Int64Value(7));
    }

    #[test]
    fn int64_rejects_garbage() {
        let result = serde_json::from_str::<TypedValue>(r#"{ "int64Value": "seven" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn string_and_bool_values() {
        let s: TypedValue = serde_json::from_str(r#"{ "stringValue": "ok" }"#).unwrap();
        assert!(s.as_f64().is_none());
        let b: TypedValue = serde_json::from_str(r#"{ "boolValue": true }"#).unwrap();
        assert_eq!(b.as_f64(), Some(1.0));
    }

    #[test]
    fn latest_picks_newest_end_time() {
        let json = r#"{
            "points": [
                { "interval": { "endTime": "2026-10-16T09:00:00Z" }, "value": { "doubleValue": 1.0 } },
                { "interval": { "endTime": "2026-10-16T10:00:00Z" }, "value": { "doubleValue": 2.0 } }
            ]
        }"#;
        let series: TimeSeries = serde_json::from_str(json).unwrap();
        assert_eq!(series.latest().unwrap().value, TypedValue::DoubleValue(2.0));
    }

    #[test]
    fn empty_series_has_no_latest() {
        assert!(TimeSeries::default().latest().is_none());
    }
}
