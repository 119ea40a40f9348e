//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use config::{Config, Environment, File, FileFormat};
use directories::BaseDirs;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, level_filters::LevelFilter, warn};

use crate::error::CliError;

mod cli;
mod store;

pub use cli::{LoggingOverrides, SettingsOverrides};
pub use store::{ConfigStore, coerce_scalar};

pub const DEFAULT_BASE_URL: &str = "https://server.smartlead.ai/api/v1";
const DEFAULT_TIMEOUT_SECS: f64 = 30.0;
const DEFAULT_RETRIES: i64 = 3;
const DEFAULT_LIMIT: i64 = 100;
const ENV_PREFIX: &str = "SMARTLEAD";
const CONFIG_DIR_NAME: &str = "smartlead-cli";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Fully-resolved settings for one invocation. Immutable after resolution.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub default_limit: u32,
    pub render_mode: RenderMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Json,
    Pretty,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

/// One configuration layer. Every field is optional; absent fields never
/// clobber a lower layer.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RawSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<f64>,
    pub retries: Option<i64>,
    pub default_limit: Option<i64>,
    pub pretty: Option<bool>,
}

impl RawSettings {
    fn overlay(&mut self, upper: RawSettings) {
        if let Some(key) = non_blank(upper.api_key) {
            self.api_key = Some(key);
        }
        if let Some(url) = non_blank(upper.base_url) {
            self.base_url = Some(url);
        }
        if let Some(seconds) = upper.timeout_seconds {
            self.timeout_seconds = Some(seconds);
        }
        if let Some(retries) = upper.retries {
            self.retries = Some(retries);
        }
        if let Some(limit) = upper.default_limit {
            self.default_limit = Some(limit);
        }
        if let Some(pretty) = upper.pretty {
            self.pretty = Some(pretty);
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawFileDocument {
    core: RawCoreSection,
    defaults: RawDefaultsSection,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCoreSection {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_seconds: Option<f64>,
    retries: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDefaultsSection {
    limit: Option<i64>,
    pretty: Option<bool>,
}

impl From<RawFileDocument> for RawSettings {
    fn from(doc: RawFileDocument) -> Self {
        Self {
            api_key: doc.core.api_key,
            base_url: doc.core.base_url,
            timeout_seconds: doc.core.timeout_seconds,
            retries: doc.core.retries,
            default_limit: doc.defaults.limit,
            pretty: doc.defaults.pretty,
        }
    }
}

/// Merge the three layers (file < environment < flags) and sanitize the result.
#[must_use]
pub fn resolve(file: RawSettings, env: RawSettings, flags: RawSettings) -> Settings {
    let mut merged = RawSettings::default();
    merged.overlay(file);
    merged.overlay(env);
    merged.overlay(flags);
    Settings::from_raw(merged)
}

/// Load settings from the persisted file, the process environment and flags.
pub fn load(path: &Path, overrides: &SettingsOverrides) -> Result<Settings, CliError> {
    let file = read_file_layer(path);
    let env = read_env_layer(std::env::vars())?;
    Ok(resolve(file, env, overrides.to_layer()))
}

/// Path of the persisted configuration file: the explicit override, or the
/// well-known location under the home directory.
pub fn config_file_path(overrides: &SettingsOverrides) -> Result<PathBuf, CliError> {
    if let Some(path) = overrides.config_file.as_ref() {
        return Ok(path.clone());
    }
    let dirs = BaseDirs::new()
        .ok_or_else(|| CliError::config("could not determine the home directory"))?;
    Ok(dirs
        .home_dir()
        .join(".config")
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME))
}

/// Read the persisted layer. A missing file is an empty layer; an unreadable
/// or malformed one is reported and ignored.
pub fn read_file_layer(path: &Path) -> RawSettings {
    if !path.exists() {
        debug!(path = %path.display(), "config.file.absent");
        return RawSettings::default();
    }

    let parsed = Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(false))
        .build()
        .and_then(|cfg| cfg.try_deserialize::<RawFileDocument>());

    match parsed {
        Ok(doc) => {
            debug!(path = %path.display(), "config.file.loaded");
            doc.into()
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "config.file.ignored");
            RawSettings::default()
        }
    }
}

/// Read the `SMARTLEAD_*` layer from the supplied variables.
pub fn read_env_layer<I>(vars: I) -> Result<RawSettings, CliError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let source = vars
        .into_iter()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect();

    Config::builder()
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .ignore_empty(true)
                .source(Some(source)),
        )
        .build()
        .and_then(|cfg| cfg.try_deserialize::<RawSettings>())
        .map_err(|err| CliError::config(format!("invalid {ENV_PREFIX}_* environment: {err}")))
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Self {
        let RawSettings {
            api_key,
            base_url,
            timeout_seconds,
            retries,
            default_limit,
            pretty,
        } = raw;

        let timeout = build_timeout(timeout_seconds);

        let retries = retries.unwrap_or(DEFAULT_RETRIES);
        let max_attempts = if retries < 1 {
            warn!(retries, "config.retries.reset");
            1
        } else {
            u32::try_from(retries).unwrap_or(u32::MAX)
        };

        let limit = default_limit.unwrap_or(DEFAULT_LIMIT);
        let default_limit = if limit < 1 {
            warn!(limit, "config.default_limit.reset");
            DEFAULT_LIMIT
        } else {
            limit
        };

        Self {
            api_key: non_blank(api_key),
            base_url: non_blank(base_url).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout,
            max_attempts,
            default_limit: u32::try_from(default_limit).unwrap_or(u32::MAX),
            render_mode: if pretty.unwrap_or(false) {
                RenderMode::Pretty
            } else {
                RenderMode::Json
            },
        }
    }

    #[must_use]
    pub fn timeout_seconds(&self) -> f64 {
        self.timeout.as_secs_f64()
    }

    /// Document shape printed by `config show`; the key is masked unless revealed.
    #[must_use]
    pub fn to_document(&self, reveal: bool) -> Value {
        let api_key = match (&self.api_key, reveal) {
            (Some(key), false) => Value::from(mask_secret(key)),
            (Some(key), true) => Value::from(key.clone()),
            (None, _) => Value::Null,
        };
        json!({
            "core": {
                "api_key": api_key,
                "base_url": self.base_url,
                "timeout_seconds": self.timeout_seconds(),
                "retries": self.max_attempts,
            },
            "defaults": {
                "limit": self.default_limit,
            },
        })
    }
}

fn build_timeout(seconds: Option<f64>) -> Duration {
    let fallback = Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS);
    match seconds {
        None => fallback,
        Some(value) if value.is_finite() && value > 0.0 => {
            Duration::try_from_secs_f64(value).unwrap_or(fallback)
        }
        Some(value) => {
            warn!(timeout_seconds = value, "config.timeout.reset");
            fallback
        }
    }
}

/// Build logging settings from the global logging flags.
pub fn build_logging_settings(logging: &LoggingOverrides) -> Result<LoggingSettings, CliError> {
    let level = LevelFilter::from_str(logging.log_level.as_str())
        .map_err(|err| CliError::config(format!("invalid --log-level: {err}")))?;
    let format = if logging.log_json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    Ok(LoggingSettings { level, format })
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(8).collect();
    format!("{visible}...********")
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
