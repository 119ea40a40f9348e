//! Bounded page scan resolving one campaign lead by id.
//!
//! The upstream has no direct lookup for a lead inside a campaign, so the
//! list endpoint is walked page by page until the lead shows up, a short page
//! signals the end of results, or the page budget is spent.

use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    client::{Ctx, RequestSpec},
    error::CliError,
    schema::BodyKind,
    util::json::{coerce_int, lookup, object_rows},
};

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_MAX_PAGES: u32 = 20;

pub async fn find_lead_entry(
    ctx: &Ctx,
    campaign_id: i64,
    lead_id: i64,
    page_size: u32,
    max_pages: u32,
) -> Result<Option<Map<String, Value>>, CliError> {
    let mut offset: u64 = 0;
    for page in 0..max_pages {
        let spec = RequestSpec::get(format!("/campaigns/{campaign_id}/leads"))
            .query("offset", offset)
            .query("limit", page_size);
        let data = ctx.fetch(spec).await?;
        let rows = data.as_json().map(page_rows).unwrap_or_default();
        debug!(campaign_id, page, offset, rows = rows.len(), "lookup.page");

        if let Some(row) = rows.iter().find(|row| matches_lead(row, lead_id)) {
            return Ok(Some((*row).clone()));
        }
        if rows.len() < page_size as usize {
            return Ok(None);
        }
        offset += u64::from(page_size);
    }
    Ok(None)
}

/// Allow-listed lead fields from the entry's nested `lead` object, usable as
/// the base of a partial update.
#[must_use]
pub fn extract_patchable(entry: &Map<String, Value>) -> Map<String, Value> {
    let Some(source) = entry.get("lead").and_then(Value::as_object) else {
        return Map::new();
    };
    BodyKind::CampaignLeadUpdate
        .shape()
        .field_names()
        .filter_map(|name| source.get(name).map(|value| (name.to_string(), value.clone())))
        .collect()
}

fn page_rows(payload: &Value) -> Vec<&Map<String, Value>> {
    let items = match payload {
        Value::Object(object) => object.get("data").and_then(Value::as_array),
        Value::Array(items) => Some(items),
        _ => None,
    };
    items.map(|items| object_rows(items).collect()).unwrap_or_default()
}

fn matches_lead(row: &Map<String, Value>, lead_id: i64) -> bool {
    let nested = row.get("lead").and_then(|lead| lookup(lead, "id"));
    [row.get("lead_id"), row.get("id"), nested]
        .into_iter()
        .flatten()
        .any(|candidate| coerce_int(candidate) == Some(lead_id))
}
