// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Integration tests for the `tools` subcommand and configuration layering.

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Command, Output, Stdio};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A command isolated from the caller's config files and environment.
fn cartopher(config_home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cartopher"));
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env_remove("API_URL")
        .env_remove("AUTH_TOKEN")
        .env_remove("TRANSPORT")
        .env_remove("CARTOPHER_API_URL")
        .env_remove("CARTOPHER_AUTH_TOKEN")
        .env_remove("CARTOPHER_TRANSPORT");
    cmd
}

fn run(cmd: &mut Command) -> Result<Output> {
    cmd.stdin(Stdio::null())
        .output()
        .context("Failed to run cartopher")
}

#[test]
fn test_tools_prints_catalog() -> Result<()> {
    let home = tempfile::tempdir()?;
    let output = run(cartopher(home.path()).arg("tools"))?;
    assert!(output.status.success());

    let catalog: Value = serde_json::from_slice(&output.stdout)?;
    let tools = catalog["tools"].as_array().context("tools is not an array")?;
    assert_eq!(tools.len(), 6);
    assert_eq!(tools[0]["name"], "list_products");
    assert_eq!(tools[2]["inputSchema"]["required"][0], "product_id");
    Ok(())
}

#[test]
fn test_invalid_api_url_fails() -> Result<()> {
    let home = tempfile::tempdir()?;
    let output = run(cartopher(home.path()).args(["--api-url", "not a url", "tools"]))?;
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    Ok(())
}

#[test]
fn test_unsupported_transport_fails() -> Result<()> {
    let home = tempfile::tempdir()?;
    let output = run(cartopher(home.path()).env("TRANSPORT", "http").arg("tools"))?;
    assert!(!output.status.success());
    Ok(())
}

#[test]
fn test_config_file_must_exist() -> Result<()> {
    let home = tempfile::tempdir()?;
    let missing = home.path().join("missing.toml");
    let output = run(cartopher(home.path()).arg("--config").arg(&missing).arg("tools"))?;
    assert!(!output.status.success());
    Ok(())
}

/// Sends one `view_cart` call and returns the response line.
fn view_cart(cmd: &mut Command) -> Result<Value> {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .context("Failed to spawn cartopher")?;
    let mut stdin = child.stdin.take().context("Failed to get stdin")?;
    let mut stdout = BufReader::new(child.stdout.take().context("Failed to get stdout")?);

    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": { "name": "view_cart", "arguments": {} }
    });
    writeln!(stdin, "{request}")?;
    stdin.flush()?;

    let mut line = String::new();
    stdout.read_line(&mut line)?;
    drop(stdin);
    child.wait()?;
    serde_json::from_str(&line).context("Failed to parse JSON response")
}

#[tokio::test(flavor = "multi_thread")]
async fn test_config_file_and_cli_overrides() -> Result<()> {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .and(header("authorization", "Bearer from-cli"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"success":true,"data":{"cart_items":[]}}"#),
        )
        .expect(1)
        .mount(&backend)
        .await;

    let home = tempfile::tempdir()?;
    let config_path = home.path().join("cartopher.toml");
    std::fs::write(
        &config_path,
        format!(
            "api_url = \"{}\"\nauth_token = \"from-file\"\nrequest_timeout = 5\n",
            backend.uri()
        ),
    )?;

    let response = view_cart(
        cartopher(home.path())
            .arg("--config")
            .arg(&config_path)
            .args(["--auth-token", "from-cli"]),
    )?;
    assert_eq!(
        response["result"]["content"][0]["text"],
        "🛒 Your cart is empty"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_plain_env_overrides_prefixed_env() -> Result<()> {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .and(header("authorization", "Bearer plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":{"total":0}}"#))
        .expect(1)
        .mount(&backend)
        .await;

    let home = tempfile::tempdir()?;
    let response = view_cart(
        cartopher(home.path())
            .env("CARTOPHER_API_URL", "http://127.0.0.1:9")
            .env("API_URL", backend.uri())
            .env("CARTOPHER_AUTH_TOKEN", "prefixed")
            .env("AUTH_TOKEN", "plain"),
    )?;
    assert_eq!(response["result"]["isError"], false);
    Ok(())
}
