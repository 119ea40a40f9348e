//! Fixed tabular projections of list-shaped responses, used in pretty mode.

use std::fmt::Write as _;

use serde_json::{Map, Value};
use unicode_width::UnicodeWidthStr;

use crate::util::json::first_present;

const WRAPPER_KEYS: [&str; 6] = ["data", "results", "items", "campaigns", "leads", "webhooks"];
const MAX_ROWS: usize = 200;
const MAX_CELL_CHARS: usize = 90;
const STATISTICS_KEYS: [&str; 7] = [
    "lead_id",
    "email",
    "status",
    "email_sequence_number",
    "open_count",
    "click_count",
    "reply_count",
];
const STATISTICS_SCAN_ROWS: usize = 25;
const STATISTICS_FALLBACK_COLUMNS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Campaign,
    CampaignLead,
    Webhook,
    Statistics,
}

impl TableKind {
    fn title(self) -> &'static str {
        match self {
            Self::Campaign => "Campaigns",
            Self::CampaignLead => "Campaign Leads",
            Self::Webhook => "Webhooks",
            Self::Statistics => "Campaign Statistics",
        }
    }

    fn columns(self) -> &'static [Column] {
        match self {
            Self::Campaign => CAMPAIGN_COLUMNS,
            Self::CampaignLead => CAMPAIGN_LEAD_COLUMNS,
            Self::Webhook => WEBHOOK_COLUMNS,
            Self::Statistics => &[],
        }
    }
}

const CAMPAIGN_COLUMNS: &[Column] = &[
    Column::first_of("ID", &["id", "campaign_id"]),
    Column::first_of("Name", &["name"]),
    Column::first_of("Status", &["status"]),
    Column::first_of("Client", &["client_id"]),
    Column::first_of("Created", &["created_at", "createdAt"]),
];

const CAMPAIGN_LEAD_COLUMNS: &[Column] = &[
    Column::first_of("Lead ID", &["id", "lead_id"]),
    Column::first_of("Email", &["email", "lead.email"]),
    Column::first_of("Name", &["name", "first_name"]),
    Column::first_of("Status", &["status", "lead_status"]),
    Column::first_of("Seq", &["email_sequence_number"]),
];

const WEBHOOK_COLUMNS: &[Column] = &[
    Column::first_of("ID", &["id", "webhook_id"]),
    Column::first_of("URL", &["url", "webhook_url"]),
    Column::first_of("Event", &["event", "event_type"]),
    Column::first_key("Active", &["is_active", "active"]),
];

#[derive(Debug, Clone, Copy)]
enum Pick {
    /// First candidate holding a non-null value.
    FirstPresent,
    /// First candidate key that exists, even when null.
    FirstKey,
}

#[derive(Debug, Clone, Copy)]
struct Column {
    header: &'static str,
    candidates: &'static [&'static str],
    pick: Pick,
}

impl Column {
    const fn first_of(header: &'static str, candidates: &'static [&'static str]) -> Self {
        Self {
            header,
            candidates,
            pick: Pick::FirstPresent,
        }
    }

    const fn first_key(header: &'static str, candidates: &'static [&'static str]) -> Self {
        Self {
            header,
            candidates,
            pick: Pick::FirstKey,
        }
    }

    fn cell(&self, row: &Value) -> String {
        let value = match self.pick {
            Pick::FirstPresent => first_present(row, self.candidates),
            Pick::FirstKey => self.candidates.iter().find_map(|key| row.get(*key)),
        };
        render_cell(value)
    }
}

/// A projected table: owned headers and string cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub title: &'static str,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Render as a title line, header row, separator and padded rows.
    #[must_use]
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.width());
            }
        }

        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        push_line(&mut out, &self.headers, &widths);
        let separator: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        push_line(&mut out, &separator, &widths);
        for row in &self.rows {
            push_line(&mut out, row, &widths);
        }
        out
    }
}

/// Project `value` into the table for `kind`, or `None` when there is no
/// list or no object rows to show.
#[must_use]
pub fn to_table(kind: TableKind, value: &Value) -> Option<Table> {
    let items = extract_list(value)?;
    let rows: Vec<&Value> = items
        .iter()
        .take(MAX_ROWS)
        .filter(|item| item.is_object())
        .collect();
    if rows.is_empty() {
        return None;
    }

    if kind == TableKind::Statistics {
        return Some(statistics_table(items, &rows));
    }

    let columns = kind.columns();
    Some(Table {
        title: kind.title(),
        headers: columns.iter().map(|c| c.header.to_string()).collect(),
        rows: rows
            .iter()
            .map(|row| columns.iter().map(|column| column.cell(row)).collect())
            .collect(),
    })
}

fn statistics_table(items: &[Value], rows: &[&Value]) -> Table {
    let scanned: Vec<&Map<String, Value>> = items
        .iter()
        .take(STATISTICS_SCAN_ROWS)
        .filter_map(Value::as_object)
        .collect();
    let mut keys: Vec<String> = STATISTICS_KEYS
        .iter()
        .filter(|key| scanned.iter().any(|row| row.contains_key(**key)))
        .map(|key| (*key).to_string())
        .collect();
    if keys.is_empty() {
        keys = rows[0]
            .as_object()
            .map(|first| {
                first
                    .keys()
                    .take(STATISTICS_FALLBACK_COLUMNS)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
    }

    Table {
        title: TableKind::Statistics.title(),
        rows: rows
            .iter()
            .map(|row| keys.iter().map(|key| render_cell(row.get(key))).collect())
            .collect(),
        headers: keys,
    }
}

fn extract_list(value: &Value) -> Option<&[Value]> {
    match value {
        Value::Array(items) => Some(items.as_slice()),
        Value::Object(object) => WRAPPER_KEYS
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice),
        _ => None,
    }
}

fn render_cell(value: Option<&Value>) -> String {
    let text = match value {
        None | Some(Value::Null) => return String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    };
    if text.chars().count() <= MAX_CELL_CHARS {
        text
    } else {
        let mut truncated: String = text.chars().take(MAX_CELL_CHARS - 3).collect();
        truncated.push_str("...");
        truncated
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.width());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}
