use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use httpmock::MockServer;
use serde_json::json;

use super::*;
use crate::config::{self, RawSettings};

fn settings(base_url: &str, api_key: Option<&str>, retries: i64) -> Settings {
    config::resolve(
        RawSettings {
            api_key: api_key.map(str::to_string),
            base_url: Some(base_url.to_string()),
            retries: Some(retries),
            ..Default::default()
        },
        RawSettings::default(),
        RawSettings::default(),
    )
}

fn status(code: u16) -> Result<RawResponse, TransportError> {
    Ok(RawResponse {
        status: code,
        headers: HeaderMap::new(),
        body: Bytes::new(),
    })
}

fn json_response(code: u16, body: &Value) -> Result<RawResponse, TransportError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(RawResponse {
        status: code,
        headers,
        body: Bytes::from(body.to_string()),
    })
}

/// Replays canned outcomes and records every request and pause.
#[derive(Default)]
struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    sent: Mutex<Vec<Url>>,
    pauses: Mutex<Vec<Duration>>,
}

impl ScriptedTransport {
    fn new(outcomes: Vec<Result<RawResponse, TransportError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            ..Default::default()
        }
    }

    fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().expect("pauses").clone()
    }

    fn sent(&self) -> Vec<Url> {
        self.sent.lock().expect("sent").clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: &PreparedRequest,
        _timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        self.sent.lock().expect("sent").push(request.url.clone());
        self.outcomes
            .lock()
            .expect("outcomes")
            .pop_front()
            .expect("script exhausted")
    }

    async fn backoff(&self, delay: Duration) {
        self.pauses.lock().expect("pauses").push(delay);
    }
}

const BASE: &str = "https://server.smartlead.ai/api/v1";

#[tokio::test]
async fn retryable_statuses_back_off_exponentially() {
    let transport = ScriptedTransport::new(vec![
        status(503),
        status(503),
        json_response(200, &json!([{"id": 1}])),
    ]);
    let settings = settings(BASE, Some("k"), 3);

    let envelope = dispatch(&settings, &transport, RequestSpec::get("/campaigns"))
        .await
        .expect("dispatch");

    assert_eq!(envelope.status_code, 200);
    assert_eq!(envelope.data, ResponseData::Json(json!([{"id": 1}])));
    assert_eq!(
        transport.pauses(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
}

#[tokio::test]
async fn final_attempt_rate_limit_is_reported_without_sleeping() {
    let transport = ScriptedTransport::new(vec![status(429)]);
    let settings = settings(BASE, Some("k"), 1);

    let err = dispatch(&settings, &transport, RequestSpec::get("/campaigns"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::RateLimit);
    assert_eq!(err.message, "Rate limit exceeded.");
    assert_eq!(err.status_code, Some(429));
    assert!(transport.pauses().is_empty());
}

#[tokio::test]
async fn retry_after_header_overrides_backoff() {
    let mut headers = HeaderMap::new();
    headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
    let transport = ScriptedTransport::new(vec![
        Ok(RawResponse {
            status: 429,
            headers,
            body: Bytes::new(),
        }),
        status(204),
    ]);
    let settings = settings(BASE, Some("k"), 2);

    let envelope = dispatch(&settings, &transport, RequestSpec::get("/campaigns"))
        .await
        .expect("dispatch");

    assert_eq!(transport.pauses(), vec![Duration::from_secs(7)]);
    assert_eq!(
        envelope.data,
        ResponseData::Json(json!({"ok": true, "status_code": 204}))
    );
}

#[tokio::test]
async fn non_positive_retry_after_falls_back_to_backoff() {
    let mut headers = HeaderMap::new();
    headers.insert(RETRY_AFTER, HeaderValue::from_static("0"));
    let transport = ScriptedTransport::new(vec![
        Ok(RawResponse {
            status: 502,
            headers,
            body: Bytes::new(),
        }),
        status(200),
    ]);
    let settings = settings(BASE, Some("k"), 2);

    dispatch(&settings, &transport, RequestSpec::get("/campaigns"))
        .await
        .expect("dispatch");
    assert_eq!(transport.pauses(), vec![Duration::from_secs(1)]);
}

#[tokio::test]
async fn timeouts_retry_then_exhaust() {
    let transport = ScriptedTransport::new(vec![
        Err(TransportError::Timeout("slow".into())),
        Err(TransportError::Timeout("still slow".into())),
    ]);
    let settings = settings(BASE, Some("k"), 2);

    let err = dispatch(&settings, &transport, RequestSpec::get("/campaigns"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Timeout);
    assert_eq!(err.message, "Request timed out after 30s");
    assert_eq!(err.detail, Some(json!("still slow")));
    assert_eq!(transport.pauses(), vec![Duration::from_secs(1)]);
}

#[tokio::test]
async fn network_errors_are_not_retried() {
    let transport = ScriptedTransport::new(vec![
        Err(TransportError::Network("connection reset".into())),
        status(200),
    ]);
    let settings = settings(BASE, Some("k"), 3);

    let err = dispatch(&settings, &transport, RequestSpec::get("/campaigns"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(err.message, "Network error: connection reset");
    assert_eq!(transport.sent().len(), 1);
    assert!(transport.pauses().is_empty());
}

#[tokio::test]
async fn missing_api_key_fails_before_any_request() {
    let transport = ScriptedTransport::new(vec![]);
    let settings = settings(BASE, None, 3);

    let err = dispatch(&settings, &transport, RequestSpec::get("/campaigns"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Auth);
    assert!(err.message.starts_with("No Smartlead API key configured"));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn unauthenticated_requests_skip_key_injection() {
    let transport = ScriptedTransport::new(vec![status(200)]);
    let settings = settings(BASE, Some("secret"), 1);

    dispatch(
        &settings,
        &transport,
        RequestSpec::get("/campaigns").requires_auth(false),
    )
    .await
    .expect("dispatch");

    assert_eq!(transport.sent()[0].query(), None);
}

#[test]
fn status_codes_map_to_error_kinds() {
    let cases = [
        (401, ErrorKind::Auth),
        (403, ErrorKind::Forbidden),
        (404, ErrorKind::NotFound),
        (429, ErrorKind::RateLimit),
        (400, ErrorKind::Validation),
        (500, ErrorKind::Api),
        (418, ErrorKind::Api),
    ];
    for (code, kind) in cases {
        let response = json_response(code, &json!({})).expect("response");
        assert_eq!(classify_failure(&response).kind, kind, "status {code}");
    }
}

#[test]
fn bad_request_prefers_upstream_message() {
    let response =
        json_response(400, &json!({"message": "", "error": "email is invalid"})).expect("resp");
    let err = classify_failure(&response);
    assert_eq!(err.message, "email is invalid");
    assert_eq!(err.detail, Some(json!({"message": "", "error": "email is invalid"})));

    let response = json_response(500, &json!(["boom"])).expect("resp");
    assert_eq!(
        classify_failure(&response).message,
        "Smartlead API request failed (500)"
    );
}

#[test]
fn text_error_bodies_are_truncated() {
    let response = RawResponse {
        status: 502,
        headers: HeaderMap::new(),
        body: Bytes::from("x".repeat(1500)),
    };
    let err = classify_failure(&response);
    let detail = err.detail.expect("detail");
    assert_eq!(detail.as_str().map(str::len), Some(1000));
}

#[test]
fn success_bodies_are_parsed_by_content_type() {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("Application/JSON; charset=utf-8"),
    );
    let broken_json = RawResponse {
        status: 200,
        headers,
        body: Bytes::from_static(b"{not json"),
    };
    assert_eq!(
        parse_success_body(&broken_json),
        ResponseData::Json(json!({"text": "{not json"}))
    );

    let text = RawResponse {
        status: 200,
        headers: HeaderMap::new(),
        body: Bytes::from_static(b"plain"),
    };
    assert_eq!(
        parse_success_body(&text),
        ResponseData::Json(json!({"text": "plain"}))
    );

    let binary = RawResponse {
        status: 200,
        headers: HeaderMap::new(),
        body: Bytes::from_static(&[0xff, 0xfe, 0x00]),
    };
    assert_eq!(
        parse_success_body(&binary),
        ResponseData::Bytes(Bytes::from_static(&[0xff, 0xfe, 0x00]))
    );
}

#[test]
fn urls_resolve_against_base() {
    let resolve = |base: &str, path: &str| resolve_url(base, path).expect("url").to_string();

    assert_eq!(
        resolve(BASE, "/campaigns"),
        "https://server.smartlead.ai/api/v1/campaigns"
    );
    assert_eq!(
        resolve(BASE, "/api/v1/campaigns/7"),
        "https://server.smartlead.ai/api/v1/campaigns/7"
    );
    assert_eq!(
        resolve("https://server.smartlead.ai/api/v1/", "campaigns"),
        "https://server.smartlead.ai/api/v1/campaigns"
    );
    assert_eq!(
        resolve(BASE, "https://other.example/hook?x=1"),
        "https://other.example/hook?x=1"
    );
}

#[test]
fn query_values_are_encoded_as_json_scalars() {
    let settings = settings(BASE, Some("k"), 1);
    let spec = RequestSpec::get("/campaigns")
        .query("offset", 10)
        .query("include_tags", true)
        .query("client_id", Option::<i64>::None)
        .query("ids", json!([1, 2]))
        .query("filter", json!({"a": 1}))
        .query("email", "a+b@x.com");

    let request = prepare(&settings, spec).expect("prepare");
    let pairs: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();

    assert_eq!(
        pairs,
        vec![
            ("api_key".to_string(), "k".to_string()),
            ("email".to_string(), "a+b@x.com".to_string()),
            ("filter".to_string(), r#"{"a":1}"#.to_string()),
            ("ids".to_string(), "1".to_string()),
            ("ids".to_string(), "2".to_string()),
            ("include_tags".to_string(), "true".to_string()),
            ("offset".to_string(), "10".to_string()),
        ]
    );
}

#[test]
fn explicit_api_key_query_is_kept() {
    let settings = settings(BASE, Some("configured"), 1);
    let spec = RequestSpec::get("/campaigns").query("api_key", "explicit");
    let request = prepare(&settings, spec).expect("prepare");
    let pairs: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();
    assert_eq!(pairs, vec![("api_key".to_string(), "explicit".to_string())]);
}

#[test]
fn invalid_headers_are_validation_errors() {
    let settings = settings(BASE, Some("k"), 1);
    let spec = RequestSpec::get("/campaigns").headers([("bad header".to_string(), "v".to_string())]);
    let err = prepare(&settings, spec).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[test]
fn backoff_is_capped() {
    assert_eq!(backoff_delay(0), Duration::from_secs(1));
    assert_eq!(backoff_delay(2), Duration::from_secs(4));
    assert_eq!(backoff_delay(3), Duration::from_secs(5));
    assert_eq!(backoff_delay(70), Duration::from_secs(5));
}

#[tokio::test]
async fn http_transport_sends_auth_query_and_body() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("POST")
                .path("/campaigns/create")
                .query_param("api_key", "live-key")
                .header("x-trace", "abc")
                .json_body(json!({"name": "Q3"}));
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"id":42,"name":"Q3"}"#);
        })
        .await;

    let ctx = Ctx::new(settings(&server.base_url(), Some("live-key"), 1));
    let envelope = ctx
        .request(
            RequestSpec::post("/api/v1/campaigns/create")
                .headers([("x-trace".to_string(), "abc".to_string())])
                .json(json!({"name": "Q3"})),
        )
        .await
        .expect("request");

    mock.assert_async().await;
    assert_eq!(envelope.data, ResponseData::Json(json!({"id": 42, "name": "Q3"})));
    assert_eq!(envelope.headers_json()["content-type"], "application/json");
}

#[tokio::test]
async fn http_transport_surfaces_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/campaigns/9");
            then.status(404)
                .header("content-type", "application/json")
                .body(r#"{"message":"no such campaign"}"#);
        })
        .await;

    let ctx = Ctx::new(settings(&server.base_url(), Some("k"), 3));
    let err = ctx
        .request(RequestSpec::get("/campaigns/9"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(err.status_code, Some(404));
    assert_eq!(err.detail, Some(json!({"message": "no such campaign"})));
}

#[tokio::test]
async fn http_transport_reports_connection_failures() {
    let ctx = Ctx::with_transport(
        settings("http://127.0.0.1:9", Some("k"), 3),
        Arc::new(HttpTransport),
    );
    let err = ctx
        .request(RequestSpec::get("/campaigns"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
}
