//! MCP (Model Context Protocol) server core.
//!
//! Provides a JSON-RPC 2.0 interface over a line-delimited byte stream so
//! that clients can discover and invoke named tools.

/// Per-request deadline and cancellation.
pub mod context;

/// Method routing, including the built-in methods.
pub mod dispatcher;

/// Handler shape and handler failures.
pub mod handler;

/// The protocol loop.
pub mod server;

/// Tool registry.
pub mod tools;

/// JSON-RPC 2.0 envelopes and line codec.
pub mod transport;

/// Wire shapes of the built-in methods.
pub mod types;

pub use context::RequestContext;
pub use dispatcher::{Dispatcher, Route};
pub use handler::{handler_fn, Handler, HandlerError, HandlerResult, Reply};
pub use server::McpServer;
pub use tools::{Tool, ToolRegistry};
pub use transport::{ErrorCode, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use types::{
    Capabilities, InputSchema, Property, ServerIdentity, ServerInfo, ToolCallResult, ToolContent,
    ToolDefinition,
};
