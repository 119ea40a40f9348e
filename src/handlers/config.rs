use serde_json::json;
use tracing::info;

use super::emit;
use crate::{
    args::ConfigCmd,
    client::{Ctx, RequestSpec},
    config::{self, ConfigStore, RawSettings},
    error::CliError,
    shape::ToPlainData,
};

pub async fn handle(ctx: &Ctx, store: &ConfigStore, cmd: ConfigCmd) -> Result<(), CliError> {
    match cmd {
        ConfigCmd::Show { reveal } => emit(ctx, &ctx.settings.to_document(reveal), None),
        ConfigCmd::Set { key, value } => {
            store
                .set_key(&key, &value)
                .map_err(|err| err.context("Failed to write config"))?;
            emit(ctx, &json!({ "ok": true, "key": key, "value": value }), None)
        }
        ConfigCmd::Path => emit(ctx, &json!({ "path": store.path().to_plain_data() }), None),
        ConfigCmd::Init { skip_validation } => init(ctx, store, skip_validation).await,
    }
}

/// Persist the effective key and base URL over the file and environment
/// layers, optionally proving the key works first. Other one-off flags are not
/// written.
async fn init(ctx: &Ctx, store: &ConfigStore, skip_validation: bool) -> Result<(), CliError> {
    if ctx.settings.api_key.is_none() {
        return Err(CliError::validation("Smartlead API key is required."));
    }

    if skip_validation {
        info!("config.init.validation_skipped");
    } else {
        let data = ctx.fetch(RequestSpec::get("/campaigns")).await?;
        let campaigns = data
            .as_json()
            .and_then(serde_json::Value::as_array)
            .map(Vec::len);
        info!(?campaigns, "config.init.validated");
    }

    let persisted = config::resolve(
        config::read_file_layer(store.path()),
        config::read_env_layer(std::env::vars())?,
        RawSettings {
            api_key: ctx.settings.api_key.clone(),
            base_url: Some(ctx.settings.base_url.clone()),
            ..RawSettings::default()
        },
    );
    store
        .save_settings(&persisted)
        .map_err(|err| err.context("Failed to write config"))?;
    info!(path = %store.path().display(), "config.init.saved");
    emit(ctx, &persisted.to_document(false), None)
}
