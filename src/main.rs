mod cli;
mod core;
mod logging;

use clap::{Parser, Subcommand};
use tracing::error;

use crate::core::config::AppConfig;

#[derive(Parser)]
#[command(
    name = "kpi",
    about = "Fetch the last hour of Cloud Monitoring KPIs",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format (text|json)
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Include backend failure causes in JSON output
    #[arg(long, global = true)]
    with_failures: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch metrics for the trailing hour (default: every key of every registry)
    Fetch {
        /// Metric keys to fetch, e.g. `network cpu`
        keys: Vec<String>,

        /// Registry to use (application|infrastructure|<custom>|all)
        #[arg(short, long)]
        registry: Option<String>,
    },
    /// List metric registries and their keys
    Registries,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate default config file
    Init,
    /// Validate config file
    Check,
    /// Print the config file path
    Path,
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.command {
        Some(Commands::Config { .. }) => AppConfig::default(),
        _ => AppConfig::load()?,
    };

    let output_opts = cli::output::OutputOptions {
        format: cli::output::OutputFormat::resolve(
            cli.json,
            cli.format.as_deref(),
            &config.settings.default_format,
        ),
        pretty: cli.pretty,
        use_color: cli::output::detect_color(!cli.no_color, &config.settings.color),
        with_failures: cli.with_failures,
    };

    match cli.command {
        None => cli::fetch_cmd::run(Vec::new(), None, &config, &output_opts).await?,
        Some(Commands::Fetch { keys, registry }) => {
            cli::fetch_cmd::run(keys, registry, &config, &output_opts).await?
        }
        Some(Commands::Registries) => cli::config_cmd::registries(&config, &output_opts)?,
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init => cli::config_cmd::init(&output_opts)?,
            ConfigAction::Check => cli::config_cmd::check(&output_opts)?,
            ConfigAction::Path => cli::config_cmd::path(&output_opts)?,
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("Failed to monitor KPIs: {:#}", e);
        std::process::exit(1);
    }
}
