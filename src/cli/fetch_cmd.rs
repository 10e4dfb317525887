use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::config::{AppConfig, ProjectScope};
use crate::core::fetcher::MetricFetcher;
use crate::core::models::report::FetchOutcome;
use crate::core::monitoring::client::CloudMonitoringClient;
use crate::core::monitoring::MonitoringBackend;
use crate::core::registry::MetricRegistry;

/// Narrow the effective registries to `filter` (`None` and `"all"` keep everything).
pub fn select_registries(
    registries: Vec<MetricRegistry>,
    filter: Option<&str>,
) -> Result<Vec<MetricRegistry>> {
    match filter {
        None | Some("all") => Ok(registries),
        Some(name) => {
            let available: Vec<String> = registries.iter().map(|r| r.name.clone()).collect();
            match registries.into_iter().find(|r| r.name == name) {
                Some(r) => Ok(vec![r]),
                None => anyhow::bail!(
                    "Unknown registry: '{}' (available: {}, all)",
                    name,
                    available.join(", ")
                ),
            }
        }
    }
}

/// Pair each key with the index of the registry that will fetch it.
///
/// No keys means every key of every registry, in order. An explicit key goes to
/// the first registry that knows it, or to the first registry (which reports it
/// as unknown without contacting the backend).
pub fn plan_fetches(registries: &[MetricRegistry], keys: &[String]) -> Vec<(usize, String)> {
    if keys.is_empty() {
        return registries
            .iter()
            .enumerate()
            .flat_map(|(i, r)| r.keys().map(move |k| (i, k.to_string())))
            .collect();
    }

    keys.iter()
        .map(|key| {
            let owner = registries.iter().position(|r| r.contains(key)).unwrap_or(0);
            (owner, key.clone())
        })
        .collect()
}

pub async fn run(
    keys: Vec<String>,
    registry_filter: Option<String>,
    config: &AppConfig,
    opts: &OutputOptions,
) -> Result<()> {
    let registries = select_registries(config.effective_registries(), registry_filter.as_deref())?;
    if registries.is_empty() {
        anyhow::bail!("No registries configured");
    }

    let project = ProjectScope::from_env()?;
    let backend: Arc<dyn MonitoringBackend> =
        Arc::new(CloudMonitoringClient::new(&config.settings.endpoint)?);

    let plan = plan_fetches(&registries, &keys);
    info!(project = project.id(), metrics = plan.len(), "fetching trailing hour");
    let fetchers: Vec<MetricFetcher> = registries
        .into_iter()
        .map(|registry| MetricFetcher::new(backend.clone(), registry, project.clone()))
        .collect();

    let mut outcomes: Vec<FetchOutcome> = Vec::with_capacity(plan.len());
    for (index, key) in plan {
        let outcome = fetchers[index].fetch(&key).await;
        debug!(key = outcome.key(), registry = index, "fetch complete");
        if opts.format == OutputFormat::Text {
            println!("{}\n", renderer::render_outcome(&outcome, opts.use_color));
        }
        outcomes.push(outcome);
    }

    let failed = outcomes
        .iter()
        .filter_map(FetchOutcome::report)
        .filter(|r| r.is_failed())
        .count();
    if failed > 0 {
        warn!(failed, "some metrics were reported empty because the backend call failed");
    }

    if opts.format == OutputFormat::Json {
        println!("{}", render_json(&outcomes, opts)?);
    }

    Ok(())
}

/// JSON array of outcomes; failure causes only with `--with-failures`.
pub fn render_json(outcomes: &[FetchOutcome], opts: &OutputOptions) -> Result<String> {
    let payloads = outcomes
        .iter()
        .map(|o| o.to_json(opts.with_failures))
        .collect::<Result<Vec<_>, _>>()?;
    let json = if opts.pretty {
        serde_json::to_string_pretty(&payloads)?
    } else {
        serde_json::to_string(&payloads)?
    };
    Ok(json)
}
