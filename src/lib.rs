// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Cartopher exposes an e-commerce REST backend to AI assistants as MCP tools.
//!
//! The server speaks JSON-RPC 2.0 over newline-delimited stdio, performs the
//! MCP handshake, and dispatches `tools/call` requests to product, cart and
//! order tools that forward to the backend.

/// Blocking REST client for the backend.
pub mod client;
/// Layered configuration.
pub mod config;
/// JSON-RPC 2.0 wire types, line framing and method dispatch.
pub mod jsonrpc;
/// MCP server, handshake and tool registry.
pub mod mcp;
/// E-commerce tool implementations.
pub mod tools;
