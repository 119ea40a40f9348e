use std::path::PathBuf;

use serde_json::{Map, Value, json};
use tracing::debug;

use super::{emit, put, send, validate_body};
use crate::{
    args::{BodyArgs, CampaignLeadsCmd, LeadPatchFlags, ScanArgs},
    client::{Ctx, RequestSpec},
    confirm::require_yes_or_confirm,
    error::CliError,
    io,
    lookup::{extract_patchable, find_lead_entry},
    schema::{self, BodyKind},
    table::TableKind,
};

pub async fn handle(ctx: &Ctx, cmd: CampaignLeadsCmd) -> Result<(), CliError> {
    match cmd {
        CampaignLeadsCmd::List {
            campaign_id,
            offset,
            limit,
        } => {
            let spec = RequestSpec::get(format!("/campaigns/{campaign_id}/leads"))
                .query("offset", offset)
                .query("limit", limit.unwrap_or(i64::from(ctx.settings.default_limit)));
            send(ctx, spec, Some(TableKind::CampaignLead)).await
        }
        CampaignLeadsCmd::Get {
            campaign_id,
            lead_id,
            scan,
        } => {
            let entry = locate(ctx, campaign_id, lead_id, scan).await?;
            emit(ctx, &entry, None)
        }
        CampaignLeadsCmd::Add { campaign_id, body } => add(ctx, campaign_id, &body).await,
        CampaignLeadsCmd::Update {
            campaign_id,
            lead_id,
            body,
        } => update(ctx, campaign_id, lead_id, &body).await,
        CampaignLeadsCmd::Patch {
            campaign_id,
            lead_id,
            fields,
            custom_fields_json,
            custom_fields_file,
            body,
            scan,
        } => {
            let custom_fields = CustomFieldsSource {
                inline: custom_fields_json,
                file: custom_fields_file,
            };
            patch(ctx, campaign_id, lead_id, fields, &custom_fields, &body, scan).await
        }
        CampaignLeadsCmd::Pause {
            campaign_id,
            lead_id,
        } => {
            let path = format!("/campaigns/{campaign_id}/leads/{lead_id}/pause");
            send(ctx, RequestSpec::post(path), None).await
        }
        CampaignLeadsCmd::Resume {
            campaign_id,
            lead_id,
            delay_days,
        } => {
            let mut body = Map::new();
            put(&mut body, "resume_lead_with_delay_days", delay_days);
            let spec = RequestSpec::post(format!("/campaigns/{campaign_id}/leads/{lead_id}/resume"))
                .json(body);
            send(ctx, spec, None).await
        }
        CampaignLeadsCmd::Unsubscribe {
            campaign_id,
            lead_id,
        } => {
            let path = format!("/campaigns/{campaign_id}/leads/{lead_id}/unsubscribe");
            send(ctx, RequestSpec::post(path), None).await
        }
        CampaignLeadsCmd::Delete {
            campaign_id,
            lead_id,
            yes,
        } => {
            require_yes_or_confirm(
                yes,
                &format!("Delete lead {lead_id} from campaign {campaign_id}?"),
            )?;
            let path = format!("/campaigns/{campaign_id}/leads/{lead_id}");
            send(ctx, RequestSpec::delete(path), None).await
        }
        CampaignLeadsCmd::MessageHistory {
            campaign_id,
            lead_id,
        } => {
            let path = format!("/campaigns/{campaign_id}/leads/{lead_id}/message-history");
            send(ctx, RequestSpec::get(path), None).await
        }
    }
}

async fn locate(
    ctx: &Ctx,
    campaign_id: i64,
    lead_id: i64,
    scan: ScanArgs,
) -> Result<Map<String, Value>, CliError> {
    find_lead_entry(ctx, campaign_id, lead_id, scan.page_size, scan.max_pages)
        .await?
        .ok_or_else(|| {
            let searched = u64::from(scan.page_size) * u64::from(scan.max_pages);
            CliError::not_found(format!(
                "Lead {lead_id} not found in campaign {campaign_id} (searched up to {searched} rows)"
            ))
        })
}

async fn add(ctx: &Ctx, campaign_id: i64, body: &BodyArgs) -> Result<(), CliError> {
    let candidate = body
        .load_required()
        .map_err(|err| err.context("Invalid request body"))?;
    let validated = validate_body(BodyKind::CampaignLeadsAdd, &candidate)?;
    let spec = RequestSpec::post(format!("/campaigns/{campaign_id}/leads"))
        .json(validated.into_value());
    send(ctx, spec, None).await
}

async fn update(
    ctx: &Ctx,
    campaign_id: i64,
    lead_id: i64,
    body: &BodyArgs,
) -> Result<(), CliError> {
    let candidate = body
        .load_required()
        .map_err(|err| err.context("Invalid request body"))?;
    let validated = validate_body(BodyKind::CampaignLeadUpdate, &candidate)?;
    let spec = RequestSpec::post(format!("/campaigns/{campaign_id}/leads/{lead_id}"))
        .json(validated.into_value());
    send(ctx, spec, None).await
}

struct CustomFieldsSource {
    inline: Option<String>,
    file: Option<PathBuf>,
}

/// Partial update: the lead's current patchable fields, overridden by the
/// patch, revalidated as a whole and sent as a full update.
async fn patch(
    ctx: &Ctx,
    campaign_id: i64,
    lead_id: i64,
    fields: LeadPatchFlags,
    custom_fields: &CustomFieldsSource,
    body: &BodyArgs,
    scan: ScanArgs,
) -> Result<(), CliError> {
    let entry = locate(ctx, campaign_id, lead_id, scan).await?;
    let current = extract_patchable(&entry);
    if current.is_empty() {
        return Err(CliError::not_found(format!(
            "Lead {lead_id} found but no patchable lead fields were returned"
        )));
    }

    let patch = build_patch(fields, custom_fields, body)?;
    if patch.is_empty() {
        return Err(CliError::validation(
            "Provide at least one patch flag or a JSON patch via --body-json/--body-file",
        ));
    }

    let merged = Value::Object(schema::merge_objects(&current, &patch));
    let validated = schema::validate(BodyKind::CampaignLeadUpdate, &merged)
        .map_err(|err| err.context("Invalid merged update body"))?;
    debug!(
        campaign_id,
        lead_id,
        patched = patch.len(),
        "campaign_lead.patch.merged"
    );

    let spec = RequestSpec::post(format!("/campaigns/{campaign_id}/leads/{lead_id}"))
        .json(validated.into_value());
    send(ctx, spec, None).await
}

/// Patch object: body first, then field flags, then custom fields.
fn build_patch(
    fields: LeadPatchFlags,
    custom_fields: &CustomFieldsSource,
    body: &BodyArgs,
) -> Result<Map<String, Value>, CliError> {
    let (mut patch, custom) =
        load_patch_inputs(custom_fields, body).map_err(|err| err.context("Invalid patch body"))?;

    put(&mut patch, "email", fields.email);
    put(&mut patch, "first_name", fields.first_name);
    put(&mut patch, "last_name", fields.last_name);
    put(&mut patch, "phone_number", fields.phone_number);
    put(&mut patch, "company_name", fields.company_name);
    put(&mut patch, "website", fields.website);
    put(&mut patch, "location", fields.location);
    put(&mut patch, "linkedin_profile", fields.linkedin_profile);
    put(&mut patch, "company_url", fields.company_url);
    put(&mut patch, "custom_fields", custom.map(Value::Object));
    Ok(patch)
}

type PatchInputs = (Map<String, Value>, Option<Map<String, Value>>);

fn load_patch_inputs(
    custom_fields: &CustomFieldsSource,
    body: &BodyArgs,
) -> Result<PatchInputs, CliError> {
    let patch = match body.load_optional()? {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(object)) => object,
        Some(_) => return Err(CliError::validation("patch body must be a JSON object")),
    };
    let custom = match io::load_optional(
        custom_fields.inline.as_deref(),
        custom_fields.file.as_deref(),
    )? {
        None | Some(Value::Null) => None,
        Some(Value::Object(object)) => Some(object),
        Some(_) => return Err(CliError::validation("custom_fields must be a JSON object")),
    };
    Ok((patch, custom))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn no_custom_fields() -> CustomFieldsSource {
        CustomFieldsSource {
            inline: None,
            file: None,
        }
    }

    fn inline_body(json: &str) -> BodyArgs {
        BodyArgs {
            body_json: Some(json.into()),
            body_file: None,
        }
    }

    #[test]
    fn flags_override_body_and_custom_fields_win() {
        let custom = CustomFieldsSource {
            inline: Some(r#"{"tier":"gold"}"#.into()),
            file: None,
        };
        let patch = build_patch(
            LeadPatchFlags {
                first_name: Some("Flag".into()),
                ..Default::default()
            },
            &custom,
            &inline_body(r#"{"first_name":"Body","custom_fields":{"x":1},"website":"w"}"#),
        )
        .expect("patch");

        assert_eq!(
            Value::Object(patch),
            json!({
                "first_name": "Flag",
                "custom_fields": {"tier": "gold"},
                "website": "w"
            })
        );
    }

    #[test]
    fn non_object_inputs_are_rejected() {
        let err = build_patch(
            LeadPatchFlags::default(),
            &no_custom_fields(),
            &inline_body("[1]"),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(
            err.message,
            "Invalid patch body: patch body must be a JSON object"
        );

        let custom = CustomFieldsSource {
            inline: Some("\"gold\"".into()),
            file: None,
        };
        let err = build_patch(LeadPatchFlags::default(), &custom, &BodyArgs::default())
            .unwrap_err();
        assert_eq!(
            err.message,
            "Invalid patch body: custom_fields must be a JSON object"
        );
    }

    #[test]
    fn absent_inputs_yield_an_empty_patch() {
        let patch = build_patch(
            LeadPatchFlags::default(),
            &no_custom_fields(),
            &BodyArgs::default(),
        )
        .expect("patch");
        assert!(patch.is_empty());
    }
}
