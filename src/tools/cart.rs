// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Shopping cart tools. Both require the bearer token.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt::Write;
use std::sync::Arc;
use tracing::{debug, info};

use super::products::Product;
use super::{Envelope, count_arg, whole_arg};
use crate::client::RestClient;
use crate::mcp::{Arguments, CallToolResult, Tool, ToolContext, ToolRegistry};

/// Body of `POST /cart/items`.
#[derive(Debug, Serialize)]
struct AddItem {
    product_id: u64,
    quantity: u64,
}

/// The user's cart.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Cart {
    /// Cart ID.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Line items; `null` for an empty cart.
    pub cart_items: Option<Vec<CartItem>>,
    /// Cart total.
    pub total: f64,
}

/// One line of the cart.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CartItem {
    /// Line ID.
    pub id: i64,
    /// The product on this line.
    pub product: Product,
    /// Units ordered.
    pub quantity: i64,
    /// Line total.
    pub subtotal: f64,
}

/// Registers `add_to_cart` and `view_cart`.
pub fn register(registry: &mut ToolRegistry, client: RestClient) {
    let tools = Arc::new(CartTools { client });

    let this = Arc::clone(&tools);
    registry.register(
        Tool::new(
            "add_to_cart",
            "Add a product to the shopping cart (requires authentication)",
            json!({
                "type": "object",
                "properties": {
                    "product_id": { "type": "number", "description": "ID of the product to add" },
                    "quantity": { "type": "number", "description": "Quantity to add (default: 1)" }
                },
                "required": ["product_id"]
            }),
        ),
        move |ctx, args| this.add_to_cart(ctx, args),
    );

    registry.register(
        Tool::new(
            "view_cart",
            "View current shopping cart contents (requires authentication)",
            json!({ "type": "object", "properties": {}, "required": [] }),
        ),
        move |ctx, args| tools.view_cart(ctx, args),
    );
}

struct CartTools {
    client: RestClient,
}

impl CartTools {
    fn add_to_cart(&self, ctx: &ToolContext, args: &Arguments) -> Result<CallToolResult> {
        let product_id = whole_arg(args, "product_id").ok_or_else(|| {
            anyhow!(
                "invalid product_id; {}",
                args.get("product_id").unwrap_or(&Value::Null)
            )
        })?;
        let quantity = count_arg(args, "quantity")
            .filter(|q| *q > 0)
            .unwrap_or(1);

        info!("{}: adding product {} x{}", ctx.tool, product_id, quantity);

        let body = self
            .client
            .with_token()
            .post(
                "/cart/items",
                Some(&AddItem {
                    product_id,
                    quantity,
                }),
            )
            .context("failed to add to cart")?;
        debug!("{}: backend replied {}", ctx.tool, body);

        let reply: Envelope<Value> =
            serde_json::from_str(&body).context("failed to parse response")?;

        if let Some(error) = reply.error_message() {
            return Ok(CallToolResult::error(format!("Error: {error}")));
        }

        Ok(CallToolResult::text(format!(
            "✓ Successfully added product {product_id} (quantity: {quantity}) to cart"
        )))
    }

    fn view_cart(&self, ctx: &ToolContext, _args: &Arguments) -> Result<CallToolResult> {
        let body = self
            .client
            .with_token()
            .get("/cart", &[])
            .context("failed to fetch cart")?;
        debug!("{}: fetched {} bytes", ctx.tool, body.len());

        let cart: Envelope<Cart> = serde_json::from_str(&body).context("failed to parse cart")?;

        Ok(CallToolResult::text(format_cart(&cart.data.unwrap_or_default())))
    }
}

fn format_cart(cart: &Cart) -> String {
    let items = cart.cart_items.as_deref().unwrap_or_default();
    if items.is_empty() {
        return "🛒 Your cart is empty".to_string();
    }

    let mut text = format!("🛒 Shopping Cart ({} items):\n\n", items.len());
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(
            text,
            "{}. {} - ${:.2} × {} = ${:.2}",
            i + 1,
            item.product.name,
            item.product.price,
            item.quantity,
            item.subtotal
        );
    }
    let _ = write!(text, "\n💰 Total: ${:.2}", cart.total);
    text
}
