use std::sync::Arc;
use tracing::{error, info, warn};

use crate::core::config::ProjectScope;
use crate::core::models::query::{ListTimeSeriesRequest, QueryWindow};
use crate::core::models::report::{FetchOutcome, MetricReport};
use crate::core::monitoring::MonitoringBackend;
use crate::core::registry::{metric_name, MetricRegistry};

/// Resolves registry keys and runs one trailing-hour query per recognized key.
pub struct MetricFetcher {
    backend: Arc<dyn MonitoringBackend>,
    registry: MetricRegistry,
    project: ProjectScope,
}

impl MetricFetcher {
    pub fn new(
        backend: Arc<dyn MonitoringBackend>,
        registry: MetricRegistry,
        project: ProjectScope,
    ) -> Self {
        Self {
            backend,
            registry,
            project,
        }
    }

    /// Fetch the last hour of data for `metric_key`.
    ///
    /// Unknown keys never reach the backend. Backend failures are logged and
    /// reported as an empty series list, with the cause kept on the report.
    pub async fn fetch(&self, metric_key: &str) -> FetchOutcome {
        let Some(metric_type) = self.registry.resolve(metric_key) else {
            error!(
                key = metric_key,
                registry = %self.registry.name,
                "Metric type for key '{}' not found.",
                metric_key
            );
            return FetchOutcome::unknown_key(metric_key);
        };

        let request = ListTimeSeriesRequest::for_metric(
            &self.project.resource_name(),
            metric_type,
            QueryWindow::trailing_hour(),
        );

        let (series, failure) = match self.backend.list_time_series(&request).await {
            Ok(series) => (series, None),
            Err(e) => {
                error!(metric_type, error = %e, "Error fetching data for {}", metric_type);
                (Vec::new(), Some(e))
            }
        };

        let report = MetricReport {
            key: metric_key.to_string(),
            metric_type: metric_type.to_string(),
            name: metric_name(metric_type).to_string(),
            series,
            failure,
        };

        if report.is_failed() {
            warn!(metric_type, "reporting no data after backend failure");
        } else {
            info!(
                metric_type,
                series = report.series.len(),
                points = report.point_count(),
                "Retrieved {} data points for {}",
                report.series.len(),
                metric_type
            );
        }

        FetchOutcome::Report(report)
    }
}
