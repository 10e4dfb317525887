use anyhow::Result;

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::config::AppConfig;
use crate::core::registry::MetricRegistry;

/// Write a config file holding the defaults and the built-in registries, ready for editing.
pub fn init(_opts: &OutputOptions) -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() {
        eprintln!("Config file already exists at {}", path.display());
        eprintln!("Remove it first if you want to regenerate.");
        return Ok(());
    }

    let config = AppConfig {
        registries: MetricRegistry::builtin(),
        ..AppConfig::default()
    };
    match config.save() {
        Ok(path) => {
            println!("Generated config at {}", path.display());
            for registry in &config.registries {
                println!(
                    "  {}: {}",
                    registry.name,
                    registry.keys().collect::<Vec<_>>().join(", ")
                );
            }
        }
        Err(e) => {
            eprintln!("Failed to generate config: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}

pub fn check(_opts: &OutputOptions) -> Result<()> {
    let path = AppConfig::config_path();
    if !path.exists() {
        println!("No config file at {} (using defaults)", path.display());
        return Ok(());
    }

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let issues = config.validate();
    if issues.is_empty() {
        println!("Config OK: {}", path.display());
        Ok(())
    } else {
        eprintln!("Config issues in {}:", path.display());
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        std::process::exit(1);
    }
}

pub fn path(_opts: &OutputOptions) -> Result<()> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}

/// List the effective registries (built-ins with overrides, then user registries).
pub fn registries(config: &AppConfig, opts: &OutputOptions) -> Result<()> {
    let registries = config.effective_registries();
    match opts.format {
        OutputFormat::Text => {
            let blocks: Vec<String> = registries
                .iter()
                .map(|r| renderer::render_registry(r, opts.use_color))
                .collect();
            println!("{}", blocks.join("\n\n"));
        }
        OutputFormat::Json => {
            let json = if opts.pretty {
                serde_json::to_string_pretty(&registries)?
            } else {
                serde_json::to_string(&registries)?
            };
            println!("{}", json);
        }
    }
    Ok(())
}
