pub mod client;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::models::query::ListTimeSeriesRequest;
use crate::core::models::time_series::TimeSeries;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to obtain access token: {0}")]
    Credentials(String),
    #[error("Request to monitoring API failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unauthorized (HTTP {status}): {body}")]
    Unauthorized { status: u16, body: String },
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Failed to parse monitoring API response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid endpoint: {0}")]
    Endpoint(String),
    #[error("Result still incomplete after {0} pages")]
    PageLimit(usize),
}

/// Read access to time series data.
#[async_trait]
pub trait MonitoringBackend: Send + Sync {
    /// Run one query and return every series across all result pages.
    async fn list_time_series(
        &self,
        request: &ListTimeSeriesRequest,
    ) -> Result<Vec<TimeSeries>, BackendError>;
}

