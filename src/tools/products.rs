// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Product listing, search, and detail tools.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::fmt::Write;
use std::sync::Arc;
use tracing::debug;

use super::{Envelope, number_arg, page_args, string_arg};
use crate::client::RestClient;
use crate::mcp::{Arguments, CallToolResult, Tool, ToolContext, ToolRegistry};

/// A catalog product.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Product {
    /// Product ID.
    pub id: i64,
    /// Owning category ID.
    pub category_id: i64,
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Unit price.
    pub price: f64,
    /// Units in stock.
    pub stock: i64,
    /// Stock keeping unit.
    pub sku: String,
    /// Whether the product is listed.
    pub is_active: bool,
    /// Owning category.
    pub category: Category,
    /// Product images; `null` when the product has none.
    pub images: Option<Vec<Image>>,
}

/// A product category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Category {
    /// Category ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Whether the category is listed.
    pub is_active: bool,
}

/// A product image.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Image {
    /// Image ID.
    pub id: i64,
    /// Image location.
    pub url: String,
    /// Alternative text.
    pub alt_text: String,
    /// Whether this is the main image.
    pub is_primary: bool,
    /// Upload time.
    pub created_at: Option<DateTime<Utc>>,
}

/// Registers `list_products`, `search_products` and `get_product_details`.
pub fn register(registry: &mut ToolRegistry, client: RestClient) {
    let tools = Arc::new(ProductTools { client });

    let this = Arc::clone(&tools);
    registry.register(
        Tool::new(
            "list_products",
            "List all available products from the store",
            json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "number",
                        "description": "Maximum number of products to return (default: 20)"
                    },
                    "offset": {
                        "type": "number",
                        "description": "Number of products to skip (default: 0)"
                    }
                },
                "required": []
            }),
        ),
        move |ctx, args| this.list_products(ctx, args),
    );

    let this = Arc::clone(&tools);
    registry.register(
        Tool::new(
            "search_products",
            "Search for products using a query string",
            json!({
                "type": "object",
                "properties": {
                    "q": { "type": "string", "description": "Search query to filter products" },
                    "limit": {
                        "type": "number",
                        "description": "Maximum number of products to return (default: 20)"
                    },
                    "offset": {
                        "type": "number",
                        "description": "Number of products to skip (default: 0)"
                    },
                    "min_price": {
                        "type": "number",
                        "description": "Minimum price to filter products"
                    },
                    "max_price": {
                        "type": "number",
                        "description": "Maximum price to filter products"
                    },
                    "category_id": {
                        "type": "string",
                        "description": "The category ID to filter products"
                    }
                },
                "required": []
            }),
        ),
        move |ctx, args| this.search_products(ctx, args),
    );

    registry.register(
        Tool::new(
            "get_product_details",
            "Get detailed information about a specific product by its ID",
            json!({
                "type": "object",
                "properties": {
                    "product_id": {
                        "type": "string",
                        "description": "The unique identifier of the product"
                    }
                },
                "required": ["product_id"]
            }),
        ),
        move |ctx, args| tools.get_product_details(ctx, args),
    );
}

struct ProductTools {
    client: RestClient,
}

impl ProductTools {
    fn list_products(&self, ctx: &ToolContext, args: &Arguments) -> Result<CallToolResult> {
        let (limit, offset) = page_args(args);
        let query = [("limit", limit.to_string()), ("offset", offset.to_string())];

        let body = self
            .client
            .get("/products", &query)
            .context("failed to fetch products")?;
        debug!("{}: fetched {} bytes", ctx.tool, body.len());

        let products: Envelope<Vec<Product>> =
            serde_json::from_str(&body).context("failed to parse products")?;

        Ok(CallToolResult::text(format_listing(
            &products.data.unwrap_or_default(),
        )))
    }

    fn search_products(&self, ctx: &ToolContext, args: &Arguments) -> Result<CallToolResult> {
        let (limit, offset) = page_args(args);
        let mut query = vec![
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
            ("q", string_arg(args, "q").unwrap_or_default()),
        ];

        if let Some(min) = number_arg(args, "min_price").filter(|p| *p > 0.0) {
            query.push(("min_price", format!("{min:.2}")));
        }
        if let Some(max) = number_arg(args, "max_price").filter(|p| *p > 0.0) {
            query.push(("max_price", format!("{max:.2}")));
        }
        if let Some(category) = string_arg(args, "category_id").filter(|c| !c.is_empty()) {
            query.push(("category", category));
        }

        let body = self
            .client
            .get("/search", &query)
            .context("failed to search products")?;
        debug!("{}: fetched {} bytes", ctx.tool, body.len());

        let products: Envelope<Vec<Product>> =
            serde_json::from_str(&body).context("failed to parse products")?;

        Ok(CallToolResult::text(format_listing(
            &products.data.unwrap_or_default(),
        )))
    }

    fn get_product_details(&self, _ctx: &ToolContext, args: &Arguments) -> Result<CallToolResult> {
        let Some(product_id) = string_arg(args, "product_id").filter(|id| is_valid_id(id)) else {
            bail!("product_id is required and must be a string of numbers. e.g 123");
        };

        let body = self
            .client
            .get(&format!("/products/{product_id}"), &[])
            .context("failed to fetch product details")?;

        let product: Envelope<Product> =
            serde_json::from_str(&body).context("failed to parse product detail data")?;

        Ok(CallToolResult::text(format_detail(
            &product.data.unwrap_or_default(),
        )))
    }
}

/// IDs are spliced into the request path, so only plain identifiers pass.
fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn format_product(product: &Product) -> String {
    format!(
        "**{}** (ID: {}) - ${:.2}",
        product.name, product.id, product.price
    )
}

fn format_listing(products: &[Product]) -> String {
    let mut text = format!("Found {} products:\n\n", products.len());
    for (i, product) in products.iter().enumerate() {
        let _ = writeln!(text, "{}. {}", i + 1, format_product(product));
    }
    text
}

fn format_detail(product: &Product) -> String {
    format!(
        "**Product Details**\n\n\
         ID: {}\n\
         Name: {}\n\
         Category: {}\n\
         Price: ${:.2}\n\
         Stock: {} units\n\n\
         Description:\n\
         {}\n",
        product.id,
        product.name,
        product.category.name,
        product.price,
        product.stock,
        product.description
    )
}
