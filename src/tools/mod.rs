// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! E-commerce tools backed by the REST API.

/// Shopping cart tools.
pub mod cart;
/// Order tools.
pub mod orders;
/// Product catalog tools.
pub mod products;

use serde::Deserialize;
use serde_json::Value;

use crate::client::RestClient;
use crate::mcp::{Arguments, ToolRegistry};

/// Registers every toolset against `client`.
pub fn register_all(registry: &mut ToolRegistry, client: &RestClient) {
    products::register(registry, client.clone());
    cart::register(registry, client.clone());
    orders::register(registry, client.clone());
}

/// Standard backend response envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    /// Whether the backend reports success.
    #[serde(default)]
    pub success: bool,
    /// Human-readable status message.
    #[serde(default)]
    pub message: Option<String>,
    /// Payload.
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    /// Backend error message, empty on success.
    #[serde(default)]
    pub error: Option<String>,
    /// Pagination info for list endpoints.
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

impl<T> Envelope<T> {
    /// The backend error, if it reported a non-empty one.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

/// Pagination metadata.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageMeta {
    /// Current page.
    pub page: i64,
    /// Page size.
    pub limit: i64,
    /// Total matching items.
    pub total: i64,
    /// Total pages.
    pub total_pages: i64,
}

/// A string argument, accepting numbers as their decimal text.
pub(crate) fn string_arg(args: &Arguments, key: &str) -> Option<String> {
    match args.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A numeric argument.
pub(crate) fn number_arg(args: &Arguments, key: &str) -> Option<f64> {
    args.get(key).and_then(Value::as_f64)
}

/// A non-negative integer argument; fractional parts are dropped.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "JSON numbers arrive as f64 and are clamped to non-negative before the cast"
)]
pub(crate) fn count_arg(args: &Arguments, key: &str) -> Option<u64> {
    number_arg(args, key)
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n as u64)
}

/// A non-negative whole-number argument, such as `4` or `4.0`.
pub(crate) fn whole_arg(args: &Arguments, key: &str) -> Option<u64> {
    number_arg(args, key)
        .filter(|n| n.fract() == 0.0)
        .and_then(|_| count_arg(args, key))
}

/// `limit`/`offset` pagination arguments with their defaults.
pub(crate) fn page_args(args: &Arguments) -> (u64, u64) {
    (
        count_arg(args, "limit").unwrap_or(20),
        count_arg(args, "offset").unwrap_or(0),
    )
}
