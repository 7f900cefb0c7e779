// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Request validation and method routing.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use super::types::{Request, Response, ResponseError};

/// Failure returned by a method handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A protocol error to report as-is.
    #[error(transparent)]
    Rpc(#[from] ResponseError),
    /// Anything else; reported as `InternalError`.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<serde_json::Error> for HandlerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(e.into())
    }
}

/// Outcome of a method handler.
pub type HandlerResult = Result<Value, HandlerError>;

/// A method handler operating on server state `S`.
pub type Handler<S> = fn(&mut S, Option<Value>) -> HandlerResult;

/// Routes decoded requests to handlers by method name.
///
/// The method table is filled before serving starts and only read afterwards.
pub struct Dispatcher<S> {
    handlers: HashMap<String, Handler<S>>,
}

impl<S> Default for Dispatcher<S> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<S> Dispatcher<S> {
    /// Creates a dispatcher with no methods.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method`, replacing any previous one.
    pub fn register(&mut self, method: impl Into<String>, handler: Handler<S>) {
        let method = method.into();
        debug!("Registered handler for {}", method);
        self.handlers.insert(method, handler);
    }

    /// Returns true if a handler is registered for `method`.
    pub fn has_method(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Handles one raw line and returns the encoded response, if one should
    /// be sent.
    ///
    /// A line that cannot be decoded always yields a parse error with a
    /// `null` id. A decoded notification never yields a response, whatever
    /// the outcome of validation or dispatch.
    pub fn handle(&self, state: &mut S, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => {
                let notification = request.is_notification();
                let response = self.dispatch(state, request);
                if notification {
                    if let Some(err) = &response.error {
                        debug!("Discarding error for notification: {}", err);
                    }
                    return None;
                }
                response
            }
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                Response::error(None, ResponseError::parse_error(e))
            }
        };

        match serde_json::to_string(&response) {
            Ok(encoded) => Some(encoded),
            Err(e) => {
                error!("Failed to encode response: {}", e);
                None
            }
        }
    }

    /// Validates and routes a decoded request.
    pub fn dispatch(&self, state: &mut S, request: Request) -> Response {
        debug!("Handling request: {} (id={:?})", request.method, request.id);

        if let Err(e) = request.validate() {
            warn!("Invalid request: {}", e);
            return Response::error(request.id, e);
        }

        let Some(handler) = self.handlers.get(&request.method) else {
            warn!("Unknown method: {}", request.method);
            return Response::error(request.id, ResponseError::method_not_found(&request.method));
        };

        match handler(state, request.params) {
            Ok(result) => Response::success(request.id, result),
            Err(HandlerError::Rpc(e)) => {
                debug!("{} failed: {}", request.method, e);
                Response::error(request.id, e)
            }
            Err(HandlerError::Internal(e)) => {
                error!("{} failed: {:#}", request.method, e);
                Response::error(request.id, ResponseError::internal(format!("{e:#}")))
            }
        }
    }
}
