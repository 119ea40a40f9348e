#![deny(clippy::all, clippy::pedantic)]

use std::path::Path;

use assert_cmd::Command;
use httpmock::MockServer;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

const ENV_VARS: [&str; 7] = [
    "SMARTLEAD_API_KEY",
    "SMARTLEAD_BASE_URL",
    "SMARTLEAD_TIMEOUT_SECONDS",
    "SMARTLEAD_RETRIES",
    "SMARTLEAD_DEFAULT_LIMIT",
    "SMARTLEAD_PRETTY",
    "SMARTLEAD_CONFIG_FILE",
];

fn smartlead(config_file: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("smartlead"));
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("RUST_LOG")
        .arg("--config-file")
        .arg(config_file)
        .write_stdin("");
    cmd
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout is one JSON document")
}

#[test]
fn campaigns_list_prints_compact_json() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/campaigns")
            .query_param("api_key", "e2e-key")
            .query_param("include_tags", "true");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"id":1,"name":"Q3","status":"ACTIVE"}]"#);
    });

    let dir = TempDir::new().expect("tempdir");
    let assert = smartlead(&dir.path().join("config.toml"))
        .env("SMARTLEAD_API_KEY", "e2e-key")
        .env("SMARTLEAD_BASE_URL", server.base_url())
        .args(["campaigns", "list", "--include-tags", "true"])
        .assert()
        .success();

    let output = assert.get_output();
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim_end(),
        r#"[{"id":1,"name":"Q3","status":"ACTIVE"}]"#
    );
    mock.assert();
}

#[test]
fn pretty_mode_renders_a_table() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/campaigns/4/webhooks");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"id":3,"webhook_url":"https://hook","event_type":"EMAIL_SENT","is_active":true}]"#);
    });

    let dir = TempDir::new().expect("tempdir");
    smartlead(&dir.path().join("config.toml"))
        .args(["--api-key", "k", "--base-url"])
        .arg(server.base_url())
        .args(["--pretty", "webhooks", "list", "4"])
        .assert()
        .success()
        .stdout(contains("Webhooks\nID  URL"))
        .stdout(contains("EMAIL_SENT"));
}

#[test]
fn missing_api_key_fails_with_auth_error() {
    let dir = TempDir::new().expect("tempdir");
    let assert = smartlead(&dir.path().join("config.toml"))
        .args(["campaigns", "get", "1"])
        .assert()
        .failure()
        .code(1);

    let payload = stdout_json(&assert.get_output().stderr);
    assert_eq!(payload["error"]["type"], "auth_error");
    assert!(assert.get_output().stdout.is_empty());
}

#[test]
fn upstream_errors_are_structured() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/campaigns/77");
        then.status(404)
            .header("content-type", "application/json")
            .body(r#"{"message":"Campaign not found"}"#);
    });

    let dir = TempDir::new().expect("tempdir");
    let assert = smartlead(&dir.path().join("config.toml"))
        .env("SMARTLEAD_API_KEY", "k")
        .env("SMARTLEAD_BASE_URL", server.base_url())
        .args(["campaigns", "get", "77"])
        .assert()
        .failure()
        .code(1);

    let payload = stdout_json(&assert.get_output().stderr);
    assert_eq!(payload["error"]["type"], "not_found");
    assert_eq!(payload["error"]["status_code"], 404);
    assert_eq!(payload["error"]["message"], "Resource not found.");
    assert_eq!(payload["error"]["detail"]["message"], "Campaign not found");
}

#[test]
fn delete_without_yes_requires_confirmation() {
    let server = MockServer::start();
    let delete = server.mock(|when, then| {
        when.method("DELETE").path("/campaigns/9");
        then.status(200);
    });

    let dir = TempDir::new().expect("tempdir");
    smartlead(&dir.path().join("config.toml"))
        .env("SMARTLEAD_API_KEY", "k")
        .env("SMARTLEAD_BASE_URL", server.base_url())
        .args(["campaigns", "delete", "9"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("confirmation_required"));
    delete.assert_hits(0);
}

#[test]
fn config_set_then_show_masks_the_key() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("nested").join("config.toml");

    smartlead(&path)
        .args(["config", "set", "core.api_key", "abcdefghijkl"])
        .assert()
        .success()
        .stdout(contains(r#""ok":true"#));
    smartlead(&path)
        .args(["config", "set", "defaults.limit", "50"])
        .assert()
        .success();

    let assert = smartlead(&path).args(["config", "show"]).assert().success();
    let shown = stdout_json(&assert.get_output().stdout);
    assert_eq!(shown["core"]["api_key"], "abcdefgh...********");
    assert_eq!(shown["defaults"]["limit"], 50);

    let assert = smartlead(&path)
        .args(["config", "show", "--reveal"])
        .assert()
        .success();
    let shown = stdout_json(&assert.get_output().stdout);
    assert_eq!(shown["core"]["api_key"], "abcdefghijkl");
}

#[test]
fn raw_examples_are_static() {
    let dir = TempDir::new().expect("tempdir");
    let assert = smartlead(&dir.path().join("config.toml"))
        .args(["raw", "examples"])
        .assert()
        .success();
    let examples = stdout_json(&assert.get_output().stdout);
    assert_eq!(examples["examples"][0]["path"], "/campaigns");
    assert_eq!(examples["examples"].as_array().map(Vec::len), Some(3));
}

#[test]
fn invalid_flags_use_clap_exit_code() {
    let dir = TempDir::new().expect("tempdir");
    smartlead(&dir.path().join("config.toml"))
        .args(["campaigns", "schedule", "1", "--day", "9"])
        .assert()
        .failure()
        .code(2);
}
