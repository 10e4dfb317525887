use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::monitoring::client::DEFAULT_ENDPOINT;
use crate::core::registry::MetricRegistry;

pub const PROJECT_ENV_VAR: &str = "GCP_PROJECT_ID";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file I/O failed: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("{0} environment variable is not set")]
    MissingProject(&'static str),
}

/// The project every query is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectScope {
    id: String,
}

impl ProjectScope {
    pub fn new(id: &str) -> Result<Self, ConfigError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ConfigError::MissingProject(PROJECT_ENV_VAR));
        }
        Ok(Self { id: id.to_string() })
    }

    /// Read `GCP_PROJECT_ID`. Unset and empty are both fatal.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_var(PROJECT_ENV_VAR)
    }

    pub fn from_var(var: &'static str) -> Result<Self, ConfigError> {
        let value = std::env::var(var).unwrap_or_default();
        if value.trim().is_empty() {
            return Err(ConfigError::MissingProject(var));
        }
        Self::new(&value)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// `projects/<id>`
    pub fn resource_name(&self) -> String {
        format!("projects/{}", self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_format")]
    pub default_format: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_format() -> String {
    "text".to_string()
}
fn default_color() -> String {
    "auto".to_string()
}
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            color: default_color(),
            endpoint: default_endpoint(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: Settings,
    /// User registries; one named like a built-in replaces it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub registries: Vec<MetricRegistry>,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("kpiwatch").join("config.toml")
    }

    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize and write this config to the config file path.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Built-ins in run order with user overrides applied, followed by user-only registries.
    pub fn effective_registries(&self) -> Vec<MetricRegistry> {
        let mut registries: Vec<MetricRegistry> = MetricRegistry::builtin()
            .into_iter()
            .map(|builtin| {
                self.registries
                    .iter()
                    .find(|r| r.name == builtin.name)
                    .cloned()
                    .unwrap_or(builtin)
            })
            .collect();

        for custom in &self.registries {
            if !registries.iter().any(|r| r.name == custom.name) {
                registries.push(custom.clone());
            }
        }
        registries
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !["text", "json"].contains(&self.settings.default_format.as_str()) {
            issues.push(format!(
                "Invalid default_format: '{}' (must be 'text' or 'json')",
                self.settings.default_format
            ));
        }
        if !["auto", "always", "never"].contains(&self.settings.color.as_str()) {
            issues.push(format!(
                "Invalid color: '{}' (must be 'auto', 'always', or 'never')",
                self.settings.color
            ));
        }
        if !self.settings.endpoint.starts_with("https://") {
            issues.push(format!(
                "Invalid endpoint: '{}' (must use HTTPS)",
                self.settings.endpoint
            ));
        }

        let mut names = HashSet::new();
        for registry in &self.registries {
            if registry.name.trim().is_empty() || registry.name == "all" {
                issues.push(format!("Invalid registry name: '{}'", registry.name));
            }
            if !names.insert(registry.name.as_str()) {
                issues.push(format!("Duplicate registry: '{}'", registry.name));
            }
            if registry.is_empty() {
                issues.push(format!("Registry '{}' has no metrics", registry.name));
            }
            let mut keys = HashSet::new();
            for entry in &registry.metrics {
                if entry.key.trim().is_empty() {
                    issues.push(format!("Registry '{}': empty metric key", registry.name));
                }
                if !keys.insert(entry.key.as_str()) {
                    issues.push(format!(
                        "Registry '{}': duplicate key '{}'",
                        registry.name, entry.key
                    ));
                }
                if !entry.metric_type.contains('/') || entry.metric_type.ends_with('/') {
                    issues.push(format!(
                        "Registry '{}': key '{}' has malformed metric type '{}'",
                        registry.name, entry.key, entry.metric_type
                    ));
                }
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let config = AppConfig::default();
        let issues = config.validate();
        assert!(issues.is_empty(), "Default config should be valid, got: {:?}", issues);
    }

    #[test]
    fn default_endpoint_is_google() {
        let settings = Settings::default();
        assert_eq!(settings.endpoint, "https://monitoring.googleapis.com");
        assert_eq!(settings.default_format, "text");
        assert_eq!(settings.color, "auto");
    }

    #[test]
    fn validate_catches_invalid_format() {
        let mut config = AppConfig::default();
        config.settings.default_format = "xml".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("default_format")));
    }

    #[test]
    fn validate_catches_invalid_color() {
        let mut config = AppConfig::default();
        config.settings.color = "blue".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("color")));
    }

    #[test]
    fn validate_catches_plain_http_endpoint() {
        let mut config = AppConfig::default();
        config.settings.endpoint = "http://monitoring.internal".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("HTTPS")));
    }

    #[test]
    fn validate_catches_registry_problems() {
        let mut config = AppConfig::default();
        config.registries = vec![
            MetricRegistry::new("edge", &[("req", "a/b"), ("req", "no_slash")]),
            MetricRegistry::new("edge", &[]),
        ];
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("duplicate key 'req'")));
        assert!(issues.iter().any(|i| i.contains("malformed metric type 'no_slash'")));
        assert!(issues.iter().any(|i| i.contains("Duplicate registry")));
        assert!(issues.iter().any(|i| i.contains("has no metrics")));
    }

    #[test]
    fn validate_rejects_reserved_registry_name() {
        let mut config = AppConfig::default();
        config.registries = vec![MetricRegistry::new("all", &[("x", "a/x")])];
        assert!(config.validate().iter().any(|i| i.contains("Invalid registry name")));
    }

    #[test]
    fn parse_empty_toml_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.settings.default_format, "text");
        assert!(config.registries.is_empty());
    }

    #[test]
    fn parse_registry_toml() {
        let toml = r#"
[settings]
default_format = "json"

[[registries]]
name = "infrastructure"

[[registries.metrics]]
key = "cpu"
type = "compute.googleapis.com/instance/cpu/reserved_cores"

[[registries]]
name = "edge"

[[registries.metrics]]
key = "requests"
type = "loadbalancing.googleapis.com/https/request_count"
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.settings.default_format, "json");
        assert_eq!(config.settings.color, "auto");
        assert_eq!(config.registries.len(), 2);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn effective_registries_apply_overrides_in_builtin_order() {
        let config = AppConfig {
            settings: Settings::default(),
            registries: vec![
                MetricRegistry::new("edge", &[("requests", "lb/request_count")]),
                MetricRegistry::new("infrastructure", &[("cpu", "compute/reserved_cores")]),
            ],
        };
        let registries = config.effective_registries();
        let names: Vec<&str> = registries.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["application", "infrastructure", "edge"]);
        assert_eq!(registries[1].resolve("cpu"), Some("compute/reserved_cores"));
        assert!(registries[1].resolve("memory").is_none());
    }

    #[test]
    fn project_scope_resource_name() {
        let scope = ProjectScope::new("demo-123").unwrap();
        assert_eq!(scope.id(), "demo-123");
        assert_eq!(scope.resource_name(), "projects/demo-123");
    }

    #[test]
    fn project_scope_rejects_blank() {
        assert!(matches!(
            ProjectScope::new("  "),
            Err(ConfigError::MissingProject(PROJECT_ENV_VAR))
        ));
    }

    #[test]
    fn project_scope_from_unset_var_names_it() {
        let err = ProjectScope::from_var("KPIWATCH_TEST_UNSET_PROJECT").unwrap_err();
        assert_eq!(
            err.to_string(),
            "KPIWATCH_TEST_UNSET_PROJECT environment variable is not set"
        );
    }

    #[test]
    fn config_path_uses_xdg_when_set() {
        std::env::set_var("XDG_CONFIG_HOME", "/tmp/test_xdg_config");
        let path = AppConfig::config_path();
        std::env::remove_var("XDG_CONFIG_HOME");
        assert_eq!(path, PathBuf::from("/tmp/test_xdg_config/kpiwatch/config.toml"));
    }
}
