//! JSON-RPC 2.0 envelope types and the line codec used by the MCP server.
//!
//! Every message travels as one JSON value per line. Requests are decoded
//! leniently: a missing `jsonrpc` tag or `method` decodes to an empty string
//! so that it is reported as an unknown method rather than a parse error.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol tag carried by every response.
pub const JSONRPC_VERSION: &str = "2.0";

/// Message used when a handler fails without explaining why.
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went terribly wrong";

/// A JSON-RPC 2.0 request received from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version; expected to be `"2.0"`.
    #[serde(default)]
    pub jsonrpc: String,
    /// Request identifier. May be a number, string, or null.
    /// Absent for notifications.
    #[serde(default)]
    pub id: Value,
    /// The RPC method name.
    #[serde(default)]
    pub method: String,
    /// Optional parameters for the method, kept undecoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Returns true when the request carries no id and must not be answered.
    pub fn is_notification(&self) -> bool {
        self.id.is_null()
    }
}

/// A JSON-RPC 2.0 response sent back to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version; always `"2.0"`.
    pub jsonrpc: String,
    /// The request identifier that this response corresponds to.
    pub id: Value,
    /// The result on success; absent on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// The error on failure; absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Creates a successful JSON-RPC response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Creates an error JSON-RPC response.
    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }

    /// The response sent for a line that is not a decodable request.
    pub fn parse_error() -> Self {
        Self::error(Value::Null, ErrorCode::ParseError.as_i32(), "Parse error")
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Numeric error code.
    pub code: i32,
    /// Human-readable error message.
    pub message: String,
}

/// Standard JSON-RPC 2.0 error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid JSON was received, or a result could not be encoded.
    ParseError,
    /// The requested method does not exist.
    MethodNotFound,
    /// Internal server error.
    InternalError,
}

impl ErrorCode {
    /// Returns the numeric error code as defined by JSON-RPC 2.0.
    pub fn as_i32(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::MethodNotFound => -32601,
            Self::InternalError => -32603,
        }
    }
}

/// Builds an error response from an optional failure and optional overrides.
///
/// The code defaults to `InternalError`. The message is the override when one
/// is given, else the failure's text, else a generic fallback.
pub fn error_response(
    id: Value,
    failure: Option<&dyn fmt::Display>,
    code: Option<i32>,
    message: Option<&str>,
) -> JsonRpcResponse {
    let code = code
        .filter(|c| *c != 0)
        .unwrap_or(ErrorCode::InternalError.as_i32());

    let message = match (message.filter(|m| !m.is_empty()), failure) {
        (Some(m), _) => m.to_string(),
        (None, Some(f)) => f.to_string(),
        (None, None) => FALLBACK_ERROR_MESSAGE.to_string(),
    };

    JsonRpcResponse::error(id, code, message)
}

/// Decodes one input line into a request.
pub fn decode_request(line: &str) -> serde_json::Result<JsonRpcRequest> {
    serde_json::from_str(line)
}

/// Encodes a response as a single line, without the trailing newline.
pub fn encode_response(response: &JsonRpcResponse) -> serde_json::Result<String> {
    serde_json::to_string(response)
}
