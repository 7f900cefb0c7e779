//! MCP server implementation.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::io::{BufRead, Write};
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

use super::registry::ToolRegistry;
use super::types::{
    CallToolParams, CallToolResult, ClientInfo, InitializeParams, InitializeResult,
    ListToolsResult, ServerCapabilities, ServerInfo, ToolsCapability,
};
use crate::jsonrpc::{Dispatcher, HandlerResult, LineReader, LineWriter, ResponseError};

/// Protocol version announced in the `initialize` result.
pub const PROTOCOL_VERSION: &str = "2025-11-25";
/// Server name announced in the `initialize` result.
pub const SERVER_NAME: &str = "CartopherCopilot";
/// Server version announced in the `initialize` result.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Handshake progress.
///
/// Tracked for logging only; `tools/*` requests are served in every phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No `initialize` seen yet.
    Uninitialized,
    /// `initialize` answered, waiting for `initialized`.
    Negotiated,
    /// Handshake complete.
    Ready,
}

/// State the method handlers operate on.
#[derive(Debug)]
pub struct ServerState {
    registry: ToolRegistry,
    phase: Phase,
    client: Option<ClientInfo>,
}

/// MCP server that communicates over a line-delimited byte stream.
pub struct McpServer {
    dispatcher: Dispatcher<ServerState>,
    state: ServerState,
}

impl McpServer {
    /// Creates a server exposing the tools in `registry`.
    ///
    /// The registry is owned by the server from here on, so the tool set
    /// cannot change while serving.
    pub fn new(registry: ToolRegistry) -> Self {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register("initialize", handle_initialize);
        dispatcher.register("initialized", handle_initialized);
        dispatcher.register("notifications/initialized", handle_initialized);
        dispatcher.register("ping", handle_ping);
        dispatcher.register("tools/list", handle_tools_list);
        dispatcher.register("tools/call", handle_tools_call);

        Self {
            dispatcher,
            state: ServerState {
                registry,
                phase: Phase::Uninitialized,
                client: None,
            },
        }
    }

    /// The tools this server exposes.
    pub const fn registry(&self) -> &ToolRegistry {
        &self.state.registry
    }

    /// Current handshake phase.
    pub const fn phase(&self) -> Phase {
        self.state.phase
    }

    /// The client that last sent `initialize`, if any.
    pub const fn client(&self) -> Option<&ClientInfo> {
        self.state.client.as_ref()
    }

    /// Handles one raw line and returns the encoded response, if any.
    pub fn handle_line(&mut self, line: &str) -> Option<String> {
        self.dispatcher.handle(&mut self.state, line)
    }

    /// Runs the MCP server, reading from stdin and writing to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin cannot be read or stdout cannot be written.
    pub fn run(&mut self) -> Result<()> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Serves requests from `input` until it reaches end of stream.
    ///
    /// Each line is fully handled and its response written before the next
    /// line is read.
    ///
    /// # Errors
    ///
    /// Returns an error on a read failure other than end of stream, or if a
    /// response cannot be written.
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, output: W) -> Result<()> {
        let mut reader = LineReader::new(input);
        let mut writer = LineWriter::new(output);

        info!(
            "MCP server starting with {} tools, waiting for requests",
            self.state.registry.len()
        );

        while let Some(line) = reader.next_line().context("Failed to read request")? {
            trace!("Received: {}", line);

            if let Some(response) = self.handle_line(&line) {
                trace!("Sending: {}", response);
                writer
                    .write_line(&response)
                    .context("Failed to write response")?;
            }
        }

        info!("MCP server shutting down (input closed)");
        Ok(())
    }
}

/// Decodes method params, mapping absence or a shape mismatch to `InvalidParams`.
fn decode_params<T: DeserializeOwned>(
    params: Option<Value>,
    message: &str,
) -> Result<T, ResponseError> {
    let params = params.ok_or_else(|| ResponseError::invalid_params(message))?;
    serde_json::from_value(params)
        .map_err(|e| ResponseError::invalid_params(message).with_data(e.to_string()))
}

fn handle_initialize(state: &mut ServerState, params: Option<Value>) -> HandlerResult {
    let params: InitializeParams = decode_params(params, "Invalid initialize parameters")?;

    info!(
        "MCP client connecting: {} v{} (protocol {})",
        params.client_info.name,
        params.client_info.version.as_deref().unwrap_or("unknown"),
        params.protocol_version
    );
    if state.phase != Phase::Uninitialized {
        debug!("Client re-sent initialize");
    }
    state.phase = Phase::Negotiated;
    state.client = Some(params.client_info);

    let result = InitializeResult {
        protocol_version: PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {
                list_changed: false,
            }),
        },
        server_info: ServerInfo {
            name: SERVER_NAME.to_string(),
            version: SERVER_VERSION.to_string(),
        },
    };

    Ok(serde_json::to_value(result)?)
}

fn handle_initialized(state: &mut ServerState, _params: Option<Value>) -> HandlerResult {
    if state.phase == Phase::Uninitialized {
        warn!("Received initialized before initialize");
    }
    state.phase = Phase::Ready;
    info!("MCP client initialized");
    Ok(Value::Null)
}

fn handle_ping(_state: &mut ServerState, _params: Option<Value>) -> HandlerResult {
    Ok(json!({}))
}

fn handle_tools_list(state: &mut ServerState, _params: Option<Value>) -> HandlerResult {
    let tools = state.registry.list();
    debug!("Listing {} tools", tools.len());

    Ok(serde_json::to_value(ListToolsResult { tools })?)
}

fn handle_tools_call(state: &mut ServerState, params: Option<Value>) -> HandlerResult {
    // Absent or `null` params are an empty envelope, not a malformed one.
    let params: CallToolParams = match params {
        None => CallToolParams::default(),
        params => decode_params(params, "Invalid tool call parameters")?,
    };

    let arguments = params.arguments.unwrap_or_default();
    info!("Calling tool: {}", params.name);
    debug!("Tool arguments: {:?}", arguments);

    let start = Instant::now();
    let result = match state.registry.execute(&params.name, &arguments) {
        Ok(result) => {
            debug!(
                "Tool {} finished in {}ms (is_error={})",
                params.name,
                start.elapsed().as_millis(),
                result.is_error
            );
            result
        }
        Err(e) => {
            error!("Tool call failed: {:#}", e);
            CallToolResult::error(format!("Error: {e:#}"))
        }
    };

    Ok(serde_json::to_value(result)?)
}
