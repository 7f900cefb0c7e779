// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

/// Tool metadata and handler registry.
mod registry;
/// MCP server implementation over a line-delimited stream.
mod server;
/// MCP type definitions.
mod types;

pub use registry::{ToolContext, ToolError, ToolFunc, ToolRegistry};
pub use server::{McpServer, PROTOCOL_VERSION, Phase, SERVER_NAME, SERVER_VERSION, ServerState};
pub use types::*;
