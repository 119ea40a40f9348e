use std::{
    collections::BTreeMap,
    fs,
    io::{self, IsTerminal, Read},
    path::Path,
};

use serde_json::Value;
use time::{Date, macros::format_description};

use crate::error::CliError;

/// Sentinel accepted by every body/value source meaning "read stdin".
pub const STDIN_SENTINEL: &str = "-";

/// Load a JSON document from exactly one of an inline value or a file path.
pub fn load_required(inline: Option<&str>, file: Option<&Path>) -> Result<Value, CliError> {
    load_required_with(inline, file, io::stdin())
}

/// Like [`load_required`], but absent sources yield `None`.
pub fn load_optional(inline: Option<&str>, file: Option<&Path>) -> Result<Option<Value>, CliError> {
    load_optional_with(inline, file, io::stdin())
}

pub fn load_required_with(
    inline: Option<&str>,
    file: Option<&Path>,
    stdin: impl Read,
) -> Result<Value, CliError> {
    let text = match (inline, file) {
        (Some(_), Some(_)) => {
            return Err(CliError::validation(
                "Use only one of --body-json or --body-file",
            ));
        }
        (None, None) => return Err(CliError::validation("Body JSON is required")),
        (Some(inline), None) => read_text_arg(inline, stdin)?,
        (None, Some(path)) if path.as_os_str() == STDIN_SENTINEL => {
            read_text_arg(STDIN_SENTINEL, stdin)?
        }
        (None, Some(path)) => fs::read_to_string(path).map_err(|err| {
            CliError::validation(format!("failed to read {}: {err}", path.display()))
        })?,
    };

    serde_json::from_str(&text).map_err(|err| CliError::validation(format!("invalid JSON: {err}")))
}

pub fn load_optional_with(
    inline: Option<&str>,
    file: Option<&Path>,
    stdin: impl Read,
) -> Result<Option<Value>, CliError> {
    if inline.is_none() && file.is_none() {
        return Ok(None);
    }
    load_required_with(inline, file, stdin).map(Some)
}

fn read_text_arg(value: &str, mut stdin: impl Read) -> Result<String, CliError> {
    if value != STDIN_SENTINEL {
        return Ok(value.to_string());
    }
    if io::stdin().is_terminal() {
        eprintln!("Reading from stdin (Ctrl+D to finish):");
    }
    let mut text = String::new();
    stdin
        .read_to_string(&mut text)
        .map_err(|err| CliError::validation(format!("failed to read stdin: {err}")))?;
    Ok(text)
}

/// Parse `KEY=VALUE` items. Later duplicates win.
pub fn parse_pairs<S: AsRef<str>>(items: &[S]) -> Result<BTreeMap<String, String>, CliError> {
    items
        .iter()
        .map(|item| split_pair(item.as_ref()).map(|(k, v)| (k, v.to_string())))
        .collect()
}

/// Parse `KEY=<json>` items. Later duplicates win.
pub fn parse_json_pairs<S: AsRef<str>>(items: &[S]) -> Result<BTreeMap<String, Value>, CliError> {
    items
        .iter()
        .map(|item| {
            let (key, raw) = split_pair(item.as_ref())?;
            let value = serde_json::from_str(raw).map_err(|err| {
                CliError::validation(format!("invalid JSON for `{key}`: {err}"))
            })?;
            Ok((key, value))
        })
        .collect()
}

fn split_pair(item: &str) -> Result<(String, &str), CliError> {
    let invalid = || CliError::validation(format!("Expected KEY=VALUE, got '{item}'"));
    let (key, value) = item.split_once('=').ok_or_else(invalid)?;
    let key = key.trim();
    if key.is_empty() {
        return Err(invalid());
    }
    Ok((key.to_string(), value))
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Result<Date, CliError> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map_err(|err| CliError::validation(format!("invalid date `{raw}`: {err}")))
}
