use std::path::PathBuf;

use clap::{Args, builder::BoolishValueParser};

use super::RawSettings;

/// Global flags forming the highest-precedence configuration layer.
#[derive(Debug, Args, Default, Clone)]
pub struct SettingsOverrides {
    /// Path to the TOML configuration file.
    #[arg(
        long = "config-file",
        env = "SMARTLEAD_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    /// API key (overrides config file and SMARTLEAD_API_KEY).
    #[arg(long = "api-key", value_name = "KEY", global = true)]
    pub api_key: Option<String>,

    /// API base URL (overrides config file and SMARTLEAD_BASE_URL).
    #[arg(long = "base-url", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Per-attempt request timeout.
    #[arg(
        long = "timeout-seconds",
        value_name = "SECONDS",
        allow_hyphen_values = true,
        global = true
    )]
    pub timeout_seconds: Option<f64>,

    /// Total attempts per request, including the first.
    #[arg(
        long = "retries",
        value_name = "COUNT",
        allow_hyphen_values = true,
        global = true
    )]
    pub retries: Option<i64>,

    /// Page size used by list commands when --limit is omitted.
    #[arg(
        long = "default-limit",
        value_name = "COUNT",
        allow_hyphen_values = true,
        global = true
    )]
    pub default_limit: Option<i64>,

    /// Render tables or indented JSON when available.
    #[arg(long, global = true)]
    pub pretty: bool,
}

impl SettingsOverrides {
    #[must_use]
    pub fn to_layer(&self) -> RawSettings {
        RawSettings {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            timeout_seconds: self.timeout_seconds,
            retries: self.retries,
            default_limit: self.default_limit,
            pretty: self.pretty.then_some(true),
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct LoggingOverrides {
    /// Log level written to stderr (trace|debug|info|warn|error).
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value = "warn",
        global = true
    )]
    pub log_level: String,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}
