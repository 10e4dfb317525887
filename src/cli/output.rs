use std::io::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Explicit flags win over the configured default.
    pub fn resolve(json_flag: bool, format_flag: Option<&str>, configured: &str) -> Self {
        if json_flag {
            return Self::Json;
        }
        match format_flag.unwrap_or(configured) {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub pretty: bool,
    pub use_color: bool,
    /// Add a `"failure"` field to failed reports in JSON output.
    pub with_failures: bool,
}

/// `--no-color` and `NO_COLOR` always disable; otherwise the config decides, with
/// `auto` meaning "stdout is a terminal".
pub fn detect_color(color_flag: bool, configured: &str) -> bool {
    if !color_flag || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    match configured {
        "always" => true,
        "never" => false,
        _ => std::io::stdout().is_terminal(),
    }
}
