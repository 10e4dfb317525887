use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::Deserialize;
use std::future::Future;
use tracing::{debug, warn};

use crate::core::auth::TokenSource;
use crate::core::models::query::ListTimeSeriesRequest;
use crate::core::models::time_series::TimeSeries;
use crate::core::monitoring::{BackendError, MonitoringBackend};

pub const DEFAULT_ENDPOINT: &str = "https://monitoring.googleapis.com";

/// Upper bound on pages followed for one query. Hitting it fails the query.
const MAX_PAGES: usize = 1000;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTimeSeriesResponse {
    #[serde(default)]
    time_series: Vec<TimeSeries>,
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    execution_errors: Vec<ExecutionError>,
}

#[derive(Debug, Deserialize)]
struct ExecutionError {
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    message: Option<String>,
}

/// One decoded result page.
pub(crate) struct Page {
    pub series: Vec<TimeSeries>,
    pub next_page_token: Option<String>,
}

/// Validate that a resolved endpoint URL uses HTTPS.
///
/// Must pass before any bearer token is attached, so credentials never travel
/// over plain HTTP or other schemes.
pub fn validate_endpoint(url: &str) -> Result<(), BackendError> {
    if !url.starts_with("https://") {
        return Err(BackendError::Endpoint(format!(
            "endpoint must use HTTPS, got: {}",
            url
        )));
    }
    Ok(())
}

/// Query string for one page of `projects.timeSeries.list`.
pub(crate) fn query_params(
    request: &ListTimeSeriesRequest,
    page_token: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("filter", request.filter.clone()),
        (
            "interval.startTime",
            request
                .interval
                .start
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        (
            "interval.endTime",
            request
                .interval
                .end
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        ("view", request.view.as_str().to_string()),
    ];
    if let Some(token) = page_token.filter(|t| !t.is_empty()) {
        params.push(("pageToken", token.to_string()));
    }
    params
}

/// Follow `nextPageToken` until the backend stops returning one.
pub(crate) async fn collect_pages<F, Fut>(mut fetch_page: F) -> Result<Vec<TimeSeries>, BackendError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page, BackendError>>,
{
    let mut all = Vec::new();
    let mut token: Option<String> = None;

    for page_no in 1..=MAX_PAGES {
        let page = fetch_page(token.take()).await?;
        debug!(page = page_no, series = page.series.len(), "received page");
        all.extend(page.series);

        match page.next_page_token.filter(|t| !t.is_empty()) {
            Some(next) => token = Some(next),
            None => return Ok(all),
        }
    }

    Err(BackendError::PageLimit(MAX_PAGES))
}

/// Cloud Monitoring v3 REST client. One instance is reused for every query of a run.
pub struct CloudMonitoringClient {
    http: reqwest::Client,
    endpoint: String,
    tokens: TokenSource,
}

impl CloudMonitoringClient {
    pub fn new(endpoint: &str) -> Result<Self, BackendError> {
        validate_endpoint(endpoint)?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("kpiwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            tokens: TokenSource::new(http.clone()),
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn list_url(&self, request: &ListTimeSeriesRequest) -> String {
        format!("{}/v3/{}/timeSeries", self.endpoint, request.name)
    }

    async fn fetch_page(
        &self,
        request: &ListTimeSeriesRequest,
        token: &str,
        page_token: Option<String>,
    ) -> Result<Page, BackendError> {
        let response = self
            .http
            .get(self.list_url(request))
            .bearer_auth(token)
            .header("Accept", "application/json")
            .query(&query_params(request, page_token.as_deref()))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Unauthorized {
                status: status.as_u16(),
                body,
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let data: ListTimeSeriesResponse = serde_json::from_slice(&bytes)?;
        for e in &data.execution_errors {
            warn!(
                code = e.code.unwrap_or_default(),
                message = e.message.as_deref().unwrap_or(""),
                "partial result from monitoring API"
            );
        }

        Ok(Page {
            series: data.time_series,
            next_page_token: data.next_page_token,
        })
    }
}

#[async_trait]
impl MonitoringBackend for CloudMonitoringClient {
    async fn list_time_series(
        &self,
        request: &ListTimeSeriesRequest,
    ) -> Result<Vec<TimeSeries>, BackendError> {
        let token = self
            .tokens
            .access_token()
            .await
            .map_err(|e| BackendError::Credentials(format!("{:#}", e)))?;

        collect_pages(|page_token| self.fetch_page(request, &token, page_token)).await
    }
}
