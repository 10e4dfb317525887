use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::Serialize;

/// Lookback of every query, in seconds.
pub const LOOKBACK_SECS: i64 = 3600;

/// Closed interval `[start, end]` passed to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl QueryWindow {
    /// The hour ending now, truncated to whole seconds.
    pub fn trailing_hour() -> Self {
        Self::ending_at(Utc::now())
    }

    pub fn ending_at(end: DateTime<Utc>) -> Self {
        let end = end.trunc_subsecs(0);
        Self {
            start: end - Duration::seconds(LOOKBACK_SECS),
            end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeSeriesView {
    Full,
}

impl TimeSeriesView {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "FULL",
        }
    }
}

/// A single read-only `timeSeries.list` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListTimeSeriesRequest {
    /// `projects/<id>`
    pub name: String,
    pub filter: String,
    pub interval: QueryWindow,
    pub view: TimeSeriesView,
}

impl ListTimeSeriesRequest {
    pub fn for_metric(project: &str, metric_type: &str, interval: QueryWindow) -> Self {
        Self {
            name: project.to_string(),
            filter: metric_type_filter(metric_type),
            interval,
            view: TimeSeriesView::Full,
        }
    }
}

pub fn metric_type_filter(metric_type: &str) -> String {
    format!("metric.type=\"{}\"", metric_type)
}
