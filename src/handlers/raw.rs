use std::collections::BTreeMap;

use reqwest::Method;
use serde_json::{Value, json};

use super::{emit, send};
use crate::{
    args::{BodyArgs, RawCmd},
    client::{Ctx, RequestSpec},
    error::CliError,
    io::{parse_json_pairs, parse_pairs},
    shape::ToPlainData,
};

pub async fn handle(ctx: &Ctx, cmd: RawCmd) -> Result<(), CliError> {
    match cmd {
        RawCmd::Request {
            method,
            path,
            query,
            query_json,
            header,
            body,
            include_meta,
            no_auth,
        } => {
            let spec = build_request(&method, path, &query, &query_json, &header, &body)
                .map_err(|err| err.context("Invalid raw request arguments"))?
                .requires_auth(!no_auth);
            if include_meta {
                let envelope = ctx.request(spec).await?;
                let meta = json!({
                    "status_code": envelope.status_code,
                    "headers": envelope.headers_json(),
                    "data": envelope.data.to_plain_data(),
                });
                emit(ctx, &meta, None)
            } else {
                send(ctx, spec, None).await
            }
        }
        RawCmd::Examples => emit(ctx, &examples(), None),
    }
}

/// Unvalidated request; string query pairs override JSON ones.
fn build_request(
    method: &str,
    path: String,
    query: &[String],
    query_json: &[String],
    header: &[String],
    body: &BodyArgs,
) -> Result<RequestSpec, CliError> {
    let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| CliError::validation(format!("invalid HTTP method '{method}'")))?;

    let mut params: BTreeMap<String, Value> = parse_json_pairs(query_json)?;
    params.extend(
        parse_pairs(query)?
            .into_iter()
            .map(|(key, value)| (key, Value::String(value))),
    );
    let headers = parse_pairs(header)?;

    Ok(RequestSpec::new(method, path)
        .queries(params)
        .headers(headers)
        .body(body.load_optional()?))
}

fn examples() -> Value {
    json!({
        "examples": [
            {"method": "GET", "path": "/campaigns"},
            {"method": "POST", "path": "/campaigns/123/status", "query": {"status": "PAUSED"}},
            {"method": "POST", "path": "/campaigns/123/leads", "body": [{"email": "a@example.com"}]},
        ]
    })
}
