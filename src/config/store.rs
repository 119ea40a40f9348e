//! Persisted configuration document: read, update single keys, save settings.

use std::{fs, path::PathBuf};

use toml::{Table, Value};
use tracing::info;

use super::Settings;
use crate::error::CliError;

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_document(&self) -> Result<Table, CliError> {
        if !self.path.exists() {
            return Ok(Table::new());
        }
        let text = fs::read_to_string(&self.path).map_err(|err| {
            CliError::config(format!("failed to read {}: {err}", self.path.display()))
        })?;
        toml::from_str::<Table>(&text).map_err(|err| {
            CliError::config(format!("failed to parse {}: {err}", self.path.display()))
        })
    }

    fn write_document(&self, doc: &Table) -> Result<(), CliError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                CliError::config(format!("failed to create {}: {err}", parent.display()))
            })?;
        }
        let text = toml::to_string(doc)
            .map_err(|err| CliError::config(format!("failed to render config: {err}")))?;
        fs::write(&self.path, text).map_err(|err| {
            CliError::config(format!("failed to write {}: {err}", self.path.display()))
        })
    }

    /// Set one dotted key (`section.key` or a top-level key) to a coerced scalar.
    /// A `null` value removes the key.
    pub fn set_key(&self, dotted_key: &str, raw_value: &str) -> Result<(), CliError> {
        let mut doc = self.read_document()?;
        let value = coerce_scalar(raw_value);

        let (table, key) = match dotted_key.split_once('.') {
            Some((section, key)) => (section_mut(&mut doc, section)?, key),
            None => (&mut doc, dotted_key),
        };
        if key.trim().is_empty() {
            return Err(CliError::config(format!("invalid config key `{dotted_key}`")));
        }
        match value {
            Some(value) => {
                table.insert(key.to_string(), value);
            }
            None => {
                table.remove(key);
            }
        }

        self.write_document(&doc)?;
        info!(key = dotted_key, path = %self.path.display(), "config.key.saved");
        Ok(())
    }

    /// Persist the core and defaults sections of `settings`, keeping any
    /// other keys already in the document.
    pub fn save_settings(&self, settings: &Settings) -> Result<(), CliError> {
        let mut doc = self.read_document()?;

        let core = section_mut(&mut doc, "core")?;
        match &settings.api_key {
            Some(key) => {
                core.insert("api_key".into(), Value::String(key.clone()));
            }
            None => {
                core.remove("api_key");
            }
        }
        core.insert("base_url".into(), Value::String(settings.base_url.clone()));
        core.insert(
            "timeout_seconds".into(),
            Value::Float(settings.timeout_seconds()),
        );
        core.insert(
            "retries".into(),
            Value::Integer(i64::from(settings.max_attempts)),
        );

        let defaults = section_mut(&mut doc, "defaults")?;
        defaults.insert(
            "limit".into(),
            Value::Integer(i64::from(settings.default_limit)),
        );

        self.write_document(&doc)?;
        info!(path = %self.path.display(), "config.saved");
        Ok(())
    }
}

fn section_mut<'a>(doc: &'a mut Table, section: &str) -> Result<&'a mut Table, CliError> {
    let entry = doc
        .entry(section.to_string())
        .or_insert(Value::Table(Table::new()));
    match entry {
        Value::Table(table) => Ok(table),
        _ => Err(CliError::config(format!("`{section}` is not a table"))),
    }
}

/// Coerce a command-line string into a TOML scalar. `None` means "remove".
#[must_use]
pub fn coerce_scalar(value: &str) -> Option<Value> {
    let lower = value.to_ascii_lowercase();
    match lower.as_str() {
        "true" => return Some(Value::Boolean(true)),
        "false" => return Some(Value::Boolean(false)),
        "null" => return None,
        _ => {}
    }
    if value.contains('.') {
        if let Ok(float) = value.parse::<f64>() {
            return Some(Value::Float(float));
        }
    } else if let Ok(int) = value.parse::<i64>() {
        return Some(Value::Integer(int));
    }
    Some(Value::String(value.to_string()))
}
