// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Tool registry: discovery metadata plus executable handlers.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use super::types::{Arguments, CallToolResult, Tool};

/// Per-call context handed to a tool handler.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Name the tool was invoked under.
    pub tool: String,
}

/// A tool implementation.
///
/// Returning `Err` is a domain-level failure; the server reports it to the
/// agent as an `isError` result, never as a JSON-RPC error.
pub type ToolFunc =
    Box<dyn Fn(&ToolContext, &Arguments) -> anyhow::Result<CallToolResult> + Send + Sync>;

/// Failure to execute a tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool is registered under the name.
    #[error("tool not found: {0}")]
    NotFound(String),
    /// The handler itself failed.
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

struct Entry {
    tool: Tool,
    handler: ToolFunc,
}

/// Registered tools, listed in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| &e.tool.name))
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool and its handler.
    ///
    /// A tool registered under an existing name replaces the earlier one and
    /// keeps its position in the listing.
    pub fn register<F>(&mut self, tool: Tool, handler: F)
    where
        F: Fn(&ToolContext, &Arguments) -> anyhow::Result<CallToolResult> + Send + Sync + 'static,
    {
        let entry = Entry {
            tool,
            handler: Box::new(handler),
        };

        if let Some(&slot) = self.index.get(&entry.tool.name) {
            warn!("Tool {} registered twice; replacing", entry.tool.name);
            self.entries[slot] = entry;
            return;
        }

        debug!("Registered tool {}", entry.tool.name);
        self.index.insert(entry.tool.name.clone(), self.entries.len());
        self.entries.push(entry);
    }

    /// Returns the metadata of every registered tool.
    pub fn list(&self) -> Vec<Tool> {
        self.entries.iter().map(|e| e.tool.clone()).collect()
    }

    /// Returns true if a tool named `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs the tool named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::NotFound`] for an unknown name and
    /// [`ToolError::Failed`] when the handler fails.
    pub fn execute(&self, name: &str, arguments: &Arguments) -> Result<CallToolResult, ToolError> {
        let entry = self
            .index
            .get(name)
            .and_then(|&slot| self.entries.get(slot))
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        let ctx = ToolContext {
            tool: name.to_string(),
        };
        Ok((entry.handler)(&ctx, arguments)?)
    }
}
