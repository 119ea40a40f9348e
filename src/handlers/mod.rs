pub mod campaign_leads;
pub mod campaigns;
pub mod config;
pub mod leads;
pub mod raw;
pub mod webhooks;

use serde_json::{Map, Value};

use crate::{
    args::Commands,
    client::{Ctx, RequestSpec},
    config::ConfigStore,
    error::CliError,
    print,
    schema::{self, BodyKind, ValidatedBody},
    shape::ToPlainData,
    table::TableKind,
};

pub async fn run(ctx: &Ctx, store: &ConfigStore, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Campaigns(cmd) => campaigns::handle(ctx, cmd.action).await,
        Commands::Leads(cmd) => leads::handle(ctx, cmd.action).await,
        Commands::Webhooks(cmd) => webhooks::handle(ctx, cmd.action).await,
        Commands::Raw(cmd) => raw::handle(ctx, cmd.action).await,
        Commands::Config(cmd) => config::handle(ctx, store, cmd.action).await,
    }
}

/// Dispatch `spec` and print the response payload.
async fn send(ctx: &Ctx, spec: RequestSpec, table: Option<TableKind>) -> Result<(), CliError> {
    let data = ctx.fetch(spec).await?;
    emit(ctx, &data, table)
}

fn emit(ctx: &Ctx, data: &impl ToPlainData, table: Option<TableKind>) -> Result<(), CliError> {
    print::emit(data, ctx.settings.render_mode, table)
}

fn validate_body(kind: BodyKind, body: &Value) -> Result<ValidatedBody, CliError> {
    schema::validate(kind, body).map_err(|err| err.context("Invalid request body"))
}

fn put(body: &mut Map<String, Value>, key: &str, value: Option<impl Into<Value>>) {
    if let Some(value) = value {
        body.insert(key.to_string(), value.into());
    }
}

fn put_list<T: Into<Value>>(body: &mut Map<String, Value>, key: &str, values: Vec<T>) {
    if !values.is_empty() {
        body.insert(key.to_string(), Value::from(values));
    }
}
