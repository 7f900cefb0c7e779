// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Order tools.

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use super::Envelope;
use crate::client::RestClient;
use crate::mcp::{Arguments, CallToolResult, Tool, ToolContext, ToolRegistry};

/// Summary of a placed order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Order {
    /// Order ID.
    pub id: i64,
    /// Backend order status, e.g. `pending`.
    pub status: String,
    /// Amount charged.
    pub total_amount: f64,
}

/// Registers `place_order`.
pub fn register(registry: &mut ToolRegistry, client: RestClient) {
    registry.register(
        Tool::new(
            "place_order",
            "Place a new order with the items in the shopping cart (requires authentication)",
            json!({ "type": "object", "properties": {}, "required": [] }),
        ),
        move |ctx, args| place_order(&client, ctx, args),
    );
}

// Failures here are reported to the client without the backend detail;
// the detail goes to the log.
fn place_order(
    client: &RestClient,
    ctx: &ToolContext,
    _args: &Arguments,
) -> Result<CallToolResult> {
    let body = match client.with_token().post::<()>("/orders", None) {
        Ok(body) => body,
        Err(e) => {
            error!("{}: {}", ctx.tool, e);
            return Ok(CallToolResult::error("Failed to place order"));
        }
    };

    let order = match serde_json::from_str::<Envelope<Order>>(&body) {
        Ok(reply) => reply.data.unwrap_or_default(),
        Err(e) => {
            error!("{}: unreadable order response: {}", ctx.tool, e);
            return Ok(CallToolResult::error("Failed to parse order response"));
        }
    };

    info!("{}: order {} is {}", ctx.tool, order.id, order.status);

    Ok(CallToolResult::text(format!(
        "Order placed successfully! Order ID: {}, Total Amount: ${:.2}",
        order.id, order.total_amount
    )))
}
