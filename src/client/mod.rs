//! HTTP dispatcher: request assembly, bounded retry with backoff, and
//! classification of the outcome into an envelope or a typed error.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use bytes::Bytes;
use reqwest::{
    Method, Url,
    header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, RETRY_AFTER},
};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::{
    config::Settings,
    error::{CliError, ErrorKind},
};

mod transport;

pub use transport::{HttpTransport, PreparedRequest, RawResponse, Transport, TransportError};

const RETRYABLE_STATUS: [u16; 5] = [429, 500, 502, 503, 504];
const AUTH_QUERY_PARAM: &str = "api_key";
const VERSION_PREFIX: &str = "api/v1/";
const MAX_BACKOFF_SECS: u64 = 5;
const ERROR_TEXT_LIMIT: usize = 1000;

/// Description of one logical API call, built fresh per call.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub query: BTreeMap<String, Value>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub requires_auth: bool,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            body: None,
            requires_auth: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add one query parameter. `None`/`null` values are dropped at dispatch.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.query.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn queries(mut self, pairs: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.query.extend(pairs);
        self
    }

    #[must_use]
    pub fn headers(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(pairs);
        self
    }

    #[must_use]
    pub fn json(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn requires_auth(mut self, requires_auth: bool) -> Self {
        self.requires_auth = requires_auth;
        self
    }
}

/// Parsed payload of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    Json(Value),
    Bytes(Bytes),
}

impl ResponseData {
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Bytes(_) => None,
        }
    }
}

/// Normalized result of one successful exchange.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub headers: HeaderMap,
    pub data: ResponseData,
}

impl ResponseEnvelope {
    /// Headers as a JSON object; repeated names keep the last value.
    #[must_use]
    pub fn headers_json(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in &self.headers {
            let text = String::from_utf8_lossy(value.as_bytes()).into_owned();
            map.insert(name.as_str().to_string(), Value::String(text));
        }
        Value::Object(map)
    }
}

/// Invocation context shared by every handler.
#[derive(Clone)]
pub struct Ctx {
    pub settings: Settings,
    transport: Arc<dyn Transport>,
}

impl Ctx {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self::with_transport(settings, Arc::new(HttpTransport))
    }

    #[must_use]
    pub fn with_transport(settings: Settings, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings,
            transport,
        }
    }

    pub async fn request(&self, spec: RequestSpec) -> Result<ResponseEnvelope, CliError> {
        dispatch(&self.settings, self.transport.as_ref(), spec).await
    }

    pub async fn fetch(&self, spec: RequestSpec) -> Result<ResponseData, CliError> {
        Ok(self.request(spec).await?.data)
    }
}

/// Execute `spec` with up to `settings.max_attempts` tries.
///
/// Timeouts and responses with a retryable status consume the attempt budget;
/// any other network failure is terminal immediately. On the last attempt a
/// retryable status falls through to ordinary status classification.
pub async fn dispatch(
    settings: &Settings,
    transport: &dyn Transport,
    spec: RequestSpec,
) -> Result<ResponseEnvelope, CliError> {
    let request = prepare(settings, spec)?;
    let max_attempts = settings.max_attempts.max(1);

    for attempt in 0..max_attempts {
        let last_attempt = attempt + 1 == max_attempts;
        debug!(
            method = %request.method,
            target = %request.log_target(),
            attempt,
            "http.attempt"
        );

        let response = match transport.send(&request, settings.timeout).await {
            Ok(response) => response,
            Err(TransportError::Timeout(detail)) => {
                if last_attempt {
                    return Err(CliError::new(
                        ErrorKind::Timeout,
                        format!("Request timed out after {}s", settings.timeout_seconds()),
                    )
                    .with_detail(detail));
                }
                let delay = backoff_delay(attempt);
                warn!(attempt, delay_secs = delay.as_secs(), "http.timeout.retry");
                transport.backoff(delay).await;
                continue;
            }
            Err(TransportError::Network(detail)) => {
                return Err(CliError::new(
                    ErrorKind::Network,
                    format!("Network error: {detail}"),
                ));
            }
        };

        if RETRYABLE_STATUS.contains(&response.status) && !last_attempt {
            let delay =
                retry_after(&response.headers).unwrap_or_else(|| backoff_delay(attempt));
            warn!(
                attempt,
                status = response.status,
                delay_secs = delay.as_secs(),
                "http.status.retry"
            );
            transport.backoff(delay).await;
            continue;
        }

        if response.status >= 400 {
            info!(status = response.status, "http.failed");
            return Err(classify_failure(&response));
        }

        debug!(status = response.status, "http.succeeded");
        return Ok(ResponseEnvelope {
            status_code: response.status,
            data: parse_success_body(&response),
            headers: response.headers,
        });
    }

    Err(CliError::cli("Unexpected request failure"))
}

/// Validate auth, resolve the URL, encode the query and build headers.
pub fn prepare(settings: &Settings, spec: RequestSpec) -> Result<PreparedRequest, CliError> {
    let RequestSpec {
        method,
        path,
        query,
        headers,
        body,
        requires_auth,
    } = spec;

    if requires_auth && settings.api_key.is_none() {
        return Err(CliError::new(
            ErrorKind::Auth,
            "No Smartlead API key configured. Set SMARTLEAD_API_KEY, use --api-key, or run `smartlead config init`.",
        ));
    }

    let mut query: BTreeMap<String, Value> = query
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .collect();
    if requires_auth && let Some(key) = &settings.api_key {
        query
            .entry(AUTH_QUERY_PARAM.to_string())
            .or_insert_with(|| Value::String(key.clone()));
    }

    let mut url = resolve_url(&settings.base_url, &path)?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &query {
            append_query_value(&mut pairs, key, value);
        }
    }

    Ok(PreparedRequest {
        method,
        url,
        headers: build_headers(&headers)?,
        body,
    })
}

/// Absolute URLs are used verbatim; anything else joins onto the base URL
/// with a redundant `api/v1/` prefix stripped.
pub fn resolve_url(base_url: &str, path: &str) -> Result<Url, CliError> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Url::parse(path)
            .map_err(|err| CliError::validation(format!("Invalid URL `{path}`: {err}")));
    }

    let base = format!("{}/", base_url.trim_end_matches('/'));
    let base = Url::parse(&base)
        .map_err(|err| CliError::config(format!("Invalid base URL `{base_url}`: {err}")))?;

    let relative = path.trim_start_matches('/');
    let relative = relative.strip_prefix(VERSION_PREFIX).unwrap_or(relative);
    base.join(relative)
        .map_err(|err| CliError::validation(format!("Invalid path `{path}`: {err}")))
}

fn append_query_value(
    pairs: &mut url::form_urlencoded::Serializer<'_, url::UrlQuery<'_>>,
    key: &str,
    value: &Value,
) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for item in items.iter().filter(|item| !item.is_null()) {
                pairs.append_pair(key, &query_scalar(item));
            }
        }
        other => {
            pairs.append_pair(key, &query_scalar(other));
        }
    }
}

fn query_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn build_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap, CliError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| CliError::validation(format!("Invalid header name `{name}`: {err}")))?;
        let header_value = HeaderValue::from_str(value).map_err(|err| {
            CliError::validation(format!("Invalid value for header `{name}`: {err}"))
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// `min(2^attempt, 5)` seconds, attempt indexed from zero.
#[must_use]
pub fn backoff_delay(attempt: u32) -> Duration {
    let secs = 2u64
        .checked_pow(attempt)
        .map_or(MAX_BACKOFF_SECS, |secs| secs.min(MAX_BACKOFF_SECS));
    Duration::from_secs(secs)
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(RETRY_AFTER)?.to_str().ok()?;
    let secs = raw.trim().parse::<u64>().ok()?;
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn parse_success_body(response: &RawResponse) -> ResponseData {
    let body = &response.body;
    if content_type(&response.headers).contains("application/json") {
        return ResponseData::Json(serde_json::from_slice(body).unwrap_or_else(|_| {
            json!({ "text": String::from_utf8_lossy(body) })
        }));
    }
    if body.is_empty() {
        return ResponseData::Json(json!({ "ok": true, "status_code": response.status }));
    }
    match std::str::from_utf8(body) {
        Ok(text) => ResponseData::Json(json!({ "text": text })),
        Err(_) => ResponseData::Bytes(body.clone()),
    }
}

fn classify_failure(response: &RawResponse) -> CliError {
    let status = response.status;
    let fallback = format!("Smartlead API request failed ({status})");

    let (message, detail) = match serde_json::from_slice::<Value>(&response.body) {
        Ok(parsed) => {
            let message = parsed
                .as_object()
                .and_then(|object| {
                    ["message", "error"]
                        .iter()
                        .find_map(|key| object.get(*key).and_then(truthy_text))
                })
                .unwrap_or(fallback);
            (message, parsed)
        }
        Err(_) => {
            let text = String::from_utf8_lossy(&response.body);
            let detail = if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.chars().take(ERROR_TEXT_LIMIT).collect())
            };
            (fallback, detail)
        }
    };

    let (kind, message) = match status {
        401 => (
            ErrorKind::Auth,
            "Authentication failed. Check SMARTLEAD_API_KEY.".to_string(),
        ),
        403 => (ErrorKind::Forbidden, "Permission denied.".to_string()),
        404 => (ErrorKind::NotFound, "Resource not found.".to_string()),
        429 => (ErrorKind::RateLimit, "Rate limit exceeded.".to_string()),
        400 => (ErrorKind::Validation, message),
        _ => (ErrorKind::Api, message),
    };

    CliError::new(kind, message)
        .with_status(status)
        .with_detail(detail)
}

fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(object) if object.is_empty() => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests;
