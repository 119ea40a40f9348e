use serde_json::json;

use super::{send, validate_body};
use crate::{
    args::{BodyArgs, WebhooksCmd},
    client::{Ctx, RequestSpec},
    confirm::require_yes_or_confirm,
    error::CliError,
    schema::BodyKind,
    table::TableKind,
};

pub async fn handle(ctx: &Ctx, cmd: WebhooksCmd) -> Result<(), CliError> {
    match cmd {
        WebhooksCmd::List { campaign_id } => {
            send(
                ctx,
                RequestSpec::get(format!("/campaigns/{campaign_id}/webhooks")),
                Some(TableKind::Webhook),
            )
            .await
        }
        WebhooksCmd::Upsert { campaign_id, body } => upsert(ctx, campaign_id, &body).await,
        WebhooksCmd::Delete {
            campaign_id,
            webhook_id,
            yes,
        } => {
            require_yes_or_confirm(
                yes,
                &format!("Delete webhook {webhook_id} from campaign {campaign_id}?"),
            )?;
            let spec = RequestSpec::delete(format!("/campaigns/{campaign_id}/webhooks"))
                .json(json!({ "id": webhook_id }));
            send(ctx, spec, None).await
        }
    }
}

async fn upsert(ctx: &Ctx, campaign_id: i64, body: &BodyArgs) -> Result<(), CliError> {
    let candidate = body
        .load_required()
        .map_err(|err| err.context("Invalid request body"))?;
    let validated = validate_body(BodyKind::CampaignWebhookUpsert, &candidate)?;
    let spec = RequestSpec::post(format!("/campaigns/{campaign_id}/webhooks"))
        .json(validated.into_value());
    send(ctx, spec, None).await
}
