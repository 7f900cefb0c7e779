/*
 * Copyright (C) 2026 Mark Wells Dev
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

//! JSON-RPC 2.0 message types.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

/// The only protocol version accepted on the wire.
pub const JSONRPC_VERSION: &str = "2.0";

/// Invalid JSON was received.
pub const PARSE_ERROR: i64 = -32700;
/// The JSON sent is not a valid request object.
pub const INVALID_REQUEST: i64 = -32600;
/// The method does not exist.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Invalid method parameters.
pub const INVALID_PARAMS: i64 = -32602;
/// An internal error occurred.
pub const INTERNAL_ERROR: i64 = -32603;

/// Request ID can be string or number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    /// A numeric ID, kept exactly as received (integer of any width or
    /// fractional).
    Number(Number),
    /// A string ID.
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// JSON-RPC request.
///
/// `jsonrpc` and `method` default to empty strings so that an envelope
/// missing them still decodes and is rejected by [`Request::validate`]
/// with the caller's `id` echoed back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// The JSON-RPC version.
    #[serde(default)]
    pub jsonrpc: String,
    /// The method name.
    #[serde(default)]
    pub method: String,
    /// The request parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// The request ID. Absent or `null` marks a notification.
    #[serde(default)]
    pub id: Option<RequestId>,
}

impl Request {
    /// Creates a request carrying `id`.
    pub fn new(id: RequestId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id: Some(id),
        }
    }

    /// Returns true when the sender does not expect a response.
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Checks the envelope before dispatch.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidRequest` error for a wrong protocol version or an
    /// empty method name.
    pub fn validate(&self) -> Result<(), ResponseError> {
        if self.jsonrpc != JSONRPC_VERSION {
            return Err(ResponseError::invalid_request(
                "Invalid JSON RPC version, must be 2.0",
            ));
        }
        if self.method.is_empty() {
            return Err(ResponseError::invalid_request("Method is required"));
        }
        Ok(())
    }
}

/// JSON-RPC response.
///
/// `id` is always serialized, as `null` when the request id could not be
/// recovered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// The JSON-RPC version.
    pub jsonrpc: String,
    /// The result of the request, if successful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// The error, if the request failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
    /// Echo of the request ID.
    pub id: Option<RequestId>,
}

impl Response {
    /// Creates a successful response.
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Creates an error response.
    pub fn error(id: Option<RequestId>, error: ResponseError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// JSON-RPC response error.
///
/// Also used as the typed error a method handler returns when it wants a
/// specific protocol error reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{message} (code {code})")]
pub struct ResponseError {
    /// The error code.
    pub code: i64,
    /// The error message.
    pub message: String,
    /// Additional error data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ResponseError {
    /// Creates an error without diagnostic data.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attaches diagnostic data.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// The line was not valid JSON or not a request object.
    pub fn parse_error(detail: impl std::fmt::Display) -> Self {
        Self::new(PARSE_ERROR, "Parse error").with_data(detail.to_string())
    }

    /// The envelope decoded but is not a valid request.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(INVALID_REQUEST, message)
    }

    /// No handler is registered for `method`.
    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, "Method not found").with_data(method)
    }

    /// The method's parameters could not be decoded.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }

    /// A handler failed in a way that has no dedicated code.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        Self::new(INTERNAL_ERROR, "Internal error").with_data(detail.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use serde_json::json;

    #[test]
    fn test_deserialize_request_with_number_id() -> Result<()> {
        let req: Request =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"tools/list","id":7}"#)?;
        assert_eq!(req.id, Some(RequestId::Number(7_i64.into())));
        assert!(req.params.is_none());
        assert!(!req.is_notification());
        Ok(())
    }

    #[test]
    fn test_deserialize_request_with_wide_number_ids() -> Result<()> {
        let fractional: Request =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"ping","id":1.5}"#)?;
        let id = fractional.id.context("expected an id")?;
        assert_eq!(id.to_string(), "1.5");
        assert_eq!(serde_json::to_value(&id)?, json!(1.5));

        let huge: Request = serde_json::from_str(
            r#"{"jsonrpc":"2.0","method":"ping","id":18446744073709551615}"#,
        )?;
        let id = huge.id.context("expected an id")?;
        assert_eq!(serde_json::to_string(&id)?, "18446744073709551615");
        Ok(())
    }

    #[test]
    fn test_deserialize_request_with_string_id() -> Result<()> {
        let req: Request = serde_json::from_str(
            r#"{"jsonrpc":"2.0","method":"tools/list","params":{},"id":"abc"}"#,
        )?;
        assert_eq!(req.id, Some(RequestId::String("abc".to_string())));
        assert_eq!(req.params, Some(json!({})));
        Ok(())
    }

    #[test]
    fn test_null_and_missing_id_are_notifications() -> Result<()> {
        let explicit: Request =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"initialized","id":null}"#)?;
        let missing: Request = serde_json::from_str(r#"{"jsonrpc":"2.0","method":"initialized"}"#)?;
        assert!(explicit.is_notification());
        assert!(missing.is_notification());
        Ok(())
    }

    #[test]
    fn test_validate_rejects_wrong_version() -> Result<()> {
        let req: Request = serde_json::from_str(r#"{"jsonrpc":"1.0","method":"x","id":1}"#)?;
        let err = req.validate().err().context("expected validation error")?;
        assert_eq!(err.code, INVALID_REQUEST);
        Ok(())
    }

    #[test]
    fn test_validate_rejects_missing_version_and_method() -> Result<()> {
        let no_version: Request = serde_json::from_str(r#"{"method":"x","id":1}"#)?;
        assert!(no_version.validate().is_err());

        let no_method: Request = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1}"#)?;
        let err = no_method.validate().err().context("expected validation error")?;
        assert_eq!(err.code, INVALID_REQUEST);
        assert_eq!(err.message, "Method is required");
        Ok(())
    }

    #[test]
    fn test_response_null_id_is_serialized() -> Result<()> {
        let resp = Response::error(None, ResponseError::parse_error("eof"));
        let value = serde_json::to_value(&resp)?;
        assert_eq!(value["id"], Value::Null);
        assert!(value.get("id").is_some());
        assert_eq!(value["error"]["code"], json!(PARSE_ERROR));
        assert!(value.get("result").is_none());
        Ok(())
    }

    #[test]
    fn test_response_success_omits_error() -> Result<()> {
        let resp = Response::success(Some(RequestId::Number(1_i64.into())), json!({"ok": true}));
        let json = serde_json::to_string(&resp)?;
        assert!(json.contains("\"result\""));
        assert!(!json.contains("\"error\""));
        Ok(())
    }

    #[test]
    fn test_null_result_is_kept() -> Result<()> {
        let resp = Response::success(Some(RequestId::Number(1_i64.into())), Value::Null);
        let value = serde_json::to_value(&resp)?;
        assert!(value.get("result").is_some());
        Ok(())
    }

    #[test]
    fn test_method_not_found_carries_method_as_data() {
        let err = ResponseError::method_not_found("nonexistent");
        assert_eq!(err.code, METHOD_NOT_FOUND);
        assert_eq!(err.data, Some(json!("nonexistent")));
    }

    #[test]
    fn test_error_data_omitted_when_absent() -> Result<()> {
        let json = serde_json::to_string(&ResponseError::invalid_params("bad"))?;
        assert!(!json.contains("data"));
        Ok(())
    }
}
