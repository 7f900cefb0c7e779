// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Cartopher MCP server and CLI.
//!
//! Serves the e-commerce tools over stdio, or prints the tool catalog.

#![allow(clippy::print_stdout, reason = "CLI tool needs to output to stdout")]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use cartopher_mcp::client::RestClient;
use cartopher_mcp::config::{Config, LogFormat};
use cartopher_mcp::mcp::{ListToolsResult, McpServer, ToolRegistry};
use cartopher_mcp::tools;

/// Command-line arguments for Cartopher.
#[derive(Parser, Debug)]
#[command(name = "cartopher")]
#[command(about = "MCP server exposing an e-commerce REST API as tools")]
#[command(version = env!("CARTOPHER_VERSION"))]
struct Args {
    /// The subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the e-commerce API. Overrides config and environment.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token for cart and order tools. Overrides config and environment.
    #[arg(long, global = true)]
    auth_token: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the MCP server on stdio (default if no subcommand given).
    Serve,

    /// Print the tool catalog as JSON and exit.
    Tools,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    match args.command {
        None | Some(Command::Serve) => run_server(&config),
        Some(Command::Tools) => run_tools(&config),
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = Config::load(args.config.clone())?;

    if let Some(url) = &args.api_url {
        config.api_url.clone_from(url);
    }
    if let Some(token) = &args.auth_token {
        config.auth_token = Some(token.clone());
    }

    Ok(config)
}

fn init_logging(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("cartopher_mcp=info".parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}

fn build_registry(config: &Config) -> Result<ToolRegistry> {
    let client = RestClient::new(
        &config.api_url,
        config.token().map(str::to_string),
        Duration::from_secs(config.request_timeout),
    )
    .context("Failed to create REST client")?;
    debug!("REST API base URL: {}", client.base_url());

    let mut registry = ToolRegistry::new();
    tools::register_all(&mut registry, &client);
    Ok(registry)
}

/// Runs the MCP server until stdin closes.
///
/// # Errors
///
/// Returns an error if the REST client cannot be built or stdio fails.
fn run_server(config: &Config) -> Result<()> {
    init_logging(config.log_format)?;

    info!(
        "Starting cartopher {} (api_url: {}, auth token: {})",
        env!("CARTOPHER_VERSION"),
        config.api_url,
        if config.token().is_some() {
            "configured"
        } else {
            "not configured"
        }
    );

    let mut server = McpServer::new(build_registry(config)?);
    info!("Registered {} tools", server.registry().len());

    if let Err(e) = server.run() {
        error!("Server error: {e:#}");
        return Err(e);
    }

    info!("Shutting down");
    Ok(())
}

/// Prints the registered tools as pretty JSON.
fn run_tools(config: &Config) -> Result<()> {
    let registry = build_registry(config)?;
    let catalog = ListToolsResult {
        tools: registry.list(),
    };
    println!("{}", serde_json::to_string_pretty(&catalog)?);
    Ok(())
}
