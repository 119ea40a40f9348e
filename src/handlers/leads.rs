use super::send;
use crate::{
    args::LeadsCmd,
    client::{Ctx, RequestSpec},
    error::CliError,
};

pub async fn handle(ctx: &Ctx, cmd: LeadsCmd) -> Result<(), CliError> {
    match cmd {
        LeadsCmd::GetByEmail { email } => {
            send(ctx, RequestSpec::get("/leads").query("email", email), None).await
        }
        LeadsCmd::UnsubscribeAll { lead_id } => {
            send(
                ctx,
                RequestSpec::post(format!("/leads/{lead_id}/unsubscribe")),
                None,
            )
            .await
        }
    }
}
