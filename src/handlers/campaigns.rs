use serde_json::{Map, Value, json};

use super::{campaign_leads, put, put_list, send, validate_body};
use crate::{
    args::{
        AnalyticsCmd, BodyArgs, CampaignScheduleFlags, CampaignStatusArg, CampaignUpdateFlags,
        CampaignsCmd,
    },
    client::{Ctx, RequestSpec},
    confirm::require_yes_or_confirm,
    error::CliError,
    io::parse_date,
    schema::BodyKind,
    shape::ToPlainData,
    table::TableKind,
};

pub async fn handle(ctx: &Ctx, cmd: CampaignsCmd) -> Result<(), CliError> {
    match cmd {
        CampaignsCmd::List {
            offset,
            client_id,
            include_tags,
        } => list(ctx, offset, client_id, include_tags).await,
        CampaignsCmd::Get { campaign_id } => {
            send(ctx, RequestSpec::get(format!("/campaigns/{campaign_id}")), None).await
        }
        CampaignsCmd::Create {
            name,
            client_id,
            body,
        } => create(ctx, name, client_id, &body).await,
        CampaignsCmd::Update {
            campaign_id,
            fields,
            body,
        } => update(ctx, campaign_id, fields, &body).await,
        CampaignsCmd::Schedule {
            campaign_id,
            fields,
            body,
        } => schedule(ctx, campaign_id, fields, &body).await,
        CampaignsCmd::Delete { campaign_id, yes } => delete(ctx, campaign_id, yes).await,
        CampaignsCmd::Status {
            campaign_id,
            status,
        } => set_status(ctx, campaign_id, status).await,
        CampaignsCmd::Statistics {
            campaign_id,
            offset,
            limit,
            email_sequence_number,
            email_status,
        } => {
            let spec = RequestSpec::get(format!("/campaigns/{campaign_id}/statistics"))
                .query("offset", offset)
                .query("limit", limit.unwrap_or(i64::from(ctx.settings.default_limit)))
                .query("email_sequence_number", email_sequence_number)
                .query("email_status", email_status);
            send(ctx, spec, Some(TableKind::Statistics)).await
        }
        CampaignsCmd::Analytics(args) => analytics(ctx, args.action).await,
        CampaignsCmd::Leads(args) => campaign_leads::handle(ctx, args.action).await,
    }
}

async fn list(
    ctx: &Ctx,
    offset: Option<i64>,
    client_id: Option<i64>,
    include_tags: Option<bool>,
) -> Result<(), CliError> {
    let spec = RequestSpec::get("/campaigns")
        .query("offset", offset)
        .query("client_id", client_id)
        .query("include_tags", include_tags);
    send(ctx, spec, Some(TableKind::Campaign)).await
}

async fn create(
    ctx: &Ctx,
    name: Option<String>,
    client_id: Option<i64>,
    body: &BodyArgs,
) -> Result<(), CliError> {
    let candidate = match body
        .load_optional()
        .map_err(|err| err.context("Invalid request body"))?
    {
        Some(candidate) => candidate,
        None => {
            let name = name.filter(|name| !name.is_empty()).ok_or_else(|| {
                CliError::validation(
                    "Provide --name or a request body via --body-json/--body-file",
                )
            })?;
            let mut fields = Map::new();
            fields.insert("name".into(), Value::from(name));
            put(&mut fields, "client_id", client_id);
            Value::Object(fields)
        }
    };

    let validated = validate_body(BodyKind::CampaignCreate, &candidate)?;
    send(
        ctx,
        RequestSpec::post("/campaigns/create").json(validated.into_value()),
        None,
    )
    .await
}

async fn update(
    ctx: &Ctx,
    campaign_id: i64,
    fields: CampaignUpdateFlags,
    body: &BodyArgs,
) -> Result<(), CliError> {
    let candidate = match body
        .load_optional()
        .map_err(|err| err.context("Invalid request body"))?
    {
        Some(candidate) => candidate,
        None => {
            let fields = update_fields(fields);
            if fields.is_empty() {
                return Err(CliError::validation(
                    "Provide at least one update flag or a request body via --body-json/--body-file",
                ));
            }
            Value::Object(fields)
        }
    };

    let validated = validate_body(BodyKind::CampaignUpdate, &candidate)?;
    let spec =
        RequestSpec::post(format!("/campaigns/{campaign_id}/settings")).json(validated.into_value());
    send(ctx, spec, None).await
}

fn update_fields(flags: CampaignUpdateFlags) -> Map<String, Value> {
    let mut fields = Map::new();
    put(&mut fields, "name", flags.name);
    put(&mut fields, "client_id", flags.client_id);
    put(&mut fields, "stop_lead_settings", flags.stop_lead_settings);
    put(&mut fields, "unsubscribe_text", flags.unsubscribe_text);
    put(&mut fields, "follow_up_percentage", flags.follow_up_percentage);
    put(&mut fields, "send_as_plain_text", flags.send_as_plain_text);
    put(&mut fields, "force_plain_text", flags.force_plain_text);
    put(&mut fields, "enable_ai_esp_matching", flags.enable_ai_esp_matching);
    put(
        &mut fields,
        "auto_pause_domain_leads_on_reply",
        flags.auto_pause_domain_leads_on_reply,
    );
    put(
        &mut fields,
        "ignore_ss_mailbox_sending_limit",
        flags.ignore_ss_mailbox_sending_limit,
    );
    put(&mut fields, "domain_level_rate_limit", flags.domain_level_rate_limit);
    put(
        &mut fields,
        "bounce_autopause_threshold",
        flags.bounce_autopause_threshold,
    );
    put_list(&mut fields, "track_settings", flags.track_settings);
    put_list(&mut fields, "ai_categorisation_options", flags.ai_category_ids);
    fields
}

async fn schedule(
    ctx: &Ctx,
    campaign_id: i64,
    fields: CampaignScheduleFlags,
    body: &BodyArgs,
) -> Result<(), CliError> {
    let candidate = match body
        .load_optional()
        .map_err(|err| err.context("Invalid request body"))?
    {
        Some(candidate) => candidate,
        None => {
            let fields = schedule_fields(fields);
            if fields.is_empty() {
                return Err(CliError::validation(
                    "Provide at least one schedule flag or a request body via --body-json/--body-file",
                ));
            }
            Value::Object(fields)
        }
    };

    let validated = validate_body(BodyKind::CampaignSchedule, &candidate)?;
    let spec = RequestSpec::post(format!("/campaigns/{campaign_id}")).json(validated.into_value());
    send(ctx, spec, None).await
}

fn schedule_fields(flags: CampaignScheduleFlags) -> Map<String, Value> {
    let mut fields = Map::new();
    put(&mut fields, "timezone", flags.timezone);
    put_list(&mut fields, "days_of_the_week", flags.days);
    put(&mut fields, "start_hour", flags.start_hour);
    put(&mut fields, "end_hour", flags.end_hour);
    put(&mut fields, "min_time_btw_emails", flags.min_time_btw_emails);
    put(&mut fields, "max_new_leads_per_day", flags.max_new_leads_per_day);
    put(&mut fields, "schedule_start_time", flags.schedule_start_time);
    fields
}

async fn delete(ctx: &Ctx, campaign_id: i64, yes: bool) -> Result<(), CliError> {
    require_yes_or_confirm(yes, &format!("Delete campaign {campaign_id}?"))?;
    send(
        ctx,
        RequestSpec::delete(format!("/campaigns/{campaign_id}")),
        None,
    )
    .await
}

async fn set_status(
    ctx: &Ctx,
    campaign_id: i64,
    status: CampaignStatusArg,
) -> Result<(), CliError> {
    let spec = RequestSpec::post(format!("/campaigns/{campaign_id}/status"))
        .json(json!({ "status": status.as_str() }));
    send(ctx, spec, None).await
}

async fn analytics(ctx: &Ctx, cmd: AnalyticsCmd) -> Result<(), CliError> {
    match cmd {
        AnalyticsCmd::Top { campaign_id } => {
            send(
                ctx,
                RequestSpec::get(format!("/campaigns/{campaign_id}/analytics")),
                None,
            )
            .await
        }
        AnalyticsCmd::ByDate {
            campaign_id,
            start_date,
            end_date,
        } => {
            let start = parse_date(&start_date)?;
            let end = parse_date(&end_date)?;
            let spec = RequestSpec::get(format!("/campaigns/{campaign_id}/analytics-by-date"))
                .query("start_date", start.to_plain_data())
                .query("end_date", end.to_plain_data());
            send(ctx, spec, None).await
        }
    }
}
