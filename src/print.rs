use std::io::{self, Write};

use serde_json::Value;

use crate::{
    config::RenderMode,
    error::CliError,
    shape::ToPlainData,
    table::{TableKind, to_table},
};

/// Render a command result: compact JSON, or in pretty mode a table when
/// `kind` yields one and indented JSON otherwise.
pub fn emit(
    data: &impl ToPlainData,
    mode: RenderMode,
    kind: Option<TableKind>,
) -> Result<(), CliError> {
    let out = render(&data.to_plain_data(), mode, kind)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{out}")
        .map_err(|err| CliError::cli(format!("failed to write output: {err}")))
}

pub fn render(value: &Value, mode: RenderMode, kind: Option<TableKind>) -> Result<String, CliError> {
    let rendered = match mode {
        RenderMode::Json => serde_json::to_string(value),
        RenderMode::Pretty => {
            if let Some(table) = kind.and_then(|kind| to_table(kind, value)) {
                return Ok(table.render().trim_end().to_string());
            }
            serde_json::to_string_pretty(value)
        }
    };
    rendered.map_err(|err| CliError::cli(format!("failed to render output: {err}")))
}

/// Write the structured error payload to stderr as one line.
pub fn error(err: &CliError) {
    let payload = err.to_json();
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "{payload}");
}
