//! MCP server that reads JSON-RPC 2.0 messages one line at a time and
//! writes one response line per request.
//!
//! Requests are handled strictly in arrival order. Notifications (requests
//! without an id) are dropped before dispatch and never answered.

use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, warn};

use crate::errors::Result;

use super::context::{RequestContext, DEFAULT_REQUEST_TIMEOUT};
use super::dispatcher::{Dispatcher, Route};
use super::handler::{Handler, HandlerError, HandlerResult, Reply};
use super::tools::{Tool, ToolRegistry};
use super::transport::{
    decode_request, encode_response, error_response, ErrorCode, JsonRpcRequest, JsonRpcResponse,
};
use super::types::{ServerIdentity, ToolCallParams, ToolsListResult};

const METHOD_NOT_FOUND_MESSAGE: &str = "Method not found.";
const MARSHAL_FAILED_MESSAGE: &str = "Response marshaling failed.";

/// The MCP server: identity, method routes and tools.
///
/// Registration takes `&mut self` while serving borrows `&self`, so the maps
/// cannot change once the loop is running.
#[derive(Debug)]
pub struct McpServer {
    identity: ServerIdentity,
    dispatcher: Dispatcher,
    tools: ToolRegistry,
    request_timeout: Duration,
}

impl McpServer {
    /// Creates a server with the built-in methods and no tools.
    pub fn new(identity: ServerIdentity) -> Self {
        Self {
            identity,
            dispatcher: Dispatcher::new(),
            tools: ToolRegistry::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Sets the lifetime of each request's context.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Identity returned by `initialize`.
    pub fn identity(&self) -> &ServerIdentity {
        &self.identity
    }

    /// Method routes, built-ins included.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Registered tools.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Registers a method handler, replacing any existing one of that name.
    pub fn add_handler(&mut self, method: impl Into<String>, handler: Handler) {
        self.dispatcher.register(method, handler);
    }

    /// Registers a tool, replacing any existing one of that name.
    pub fn add_tool(&mut self, tool: Tool) {
        self.tools.register(tool);
    }

    /// Serves requests from stdin, writing responses to stdout, until stdin
    /// is closed.
    pub async fn run(&self) -> Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.serve(reader, writer).await
    }

    /// Serves requests from `reader`, writing responses to `writer`.
    ///
    /// Returns `Ok(())` at end of input and an I/O error if reading or
    /// writing fails.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                debug!("input closed");
                return Ok(());
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) => self.handle_line(line).await,
                Err(e) => {
                    warn!(error = %e, "input line is not valid UTF-8");
                    Some(JsonRpcResponse::parse_error())
                }
            };

            if let Some(resp) = response {
                let line = match encode_response(&resp) {
                    Ok(s) => s,
                    Err(e) => {
                        error!(error = %e, "failed to serialize response");
                        continue;
                    }
                };
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
    }

    /// Handles one raw input line.
    ///
    /// Returns `None` for blank lines and notifications.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match decode_request(line) {
            Ok(request) => self.process_request(request).await,
            Err(e) => {
                warn!(error = %e, "failed to parse JSON-RPC request");
                Some(JsonRpcResponse::parse_error())
            }
        }
    }

    /// Dispatches a decoded request and builds its response.
    ///
    /// Returns `None` for notifications, which are not dispatched at all.
    pub async fn process_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            debug!(method = %request.method, "skipping notification");
            return None;
        }

        let id = request.id;
        let Some(route) = self.dispatcher.resolve(&request.method) else {
            warn!(method = %request.method, "method not found");
            return Some(JsonRpcResponse::error(
                id,
                ErrorCode::MethodNotFound.as_i32(),
                METHOD_NOT_FOUND_MESSAGE,
            ));
        };

        debug!(method = %request.method, "dispatching request");
        let ctx = RequestContext::with_timeout(self.request_timeout);
        let outcome = self.call(route, ctx.clone(), request.params).await;
        ctx.cancel();

        let response = match outcome {
            Ok(reply) => match reply.encode() {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(e) => {
                    warn!(method = %request.method, error = %e, "failed to encode result");
                    error_response(
                        id,
                        Some(&e),
                        Some(ErrorCode::ParseError.as_i32()),
                        Some(MARSHAL_FAILED_MESSAGE),
                    )
                }
            },
            Err(e) => {
                warn!(method = %request.method, error = %e, "request failed");
                error_response(id, Some(&e), Some(e.code()), None)
            }
        };
        Some(response)
    }

    async fn call(&self, route: &Route, ctx: RequestContext, params: Option<Value>) -> HandlerResult {
        match route {
            Route::Initialize => self.handle_initialize(),
            Route::ToolsList => self.handle_tools_list(),
            Route::ToolsCall => self.handle_tools_call(ctx, params).await,
            Route::Custom(handler) => handler(ctx, params).await,
        }
    }

    /// Handles `initialize`, returning the server's identity. Params are ignored.
    fn handle_initialize(&self) -> HandlerResult {
        Ok(Box::new(self.identity.clone()) as Reply)
    }

    /// Handles `tools/list`, returning every tool definition. Params are ignored.
    fn handle_tools_list(&self) -> HandlerResult {
        Ok(Box::new(ToolsListResult {
            tools: self.tools.list(),
        }) as Reply)
    }

    /// Handles `tools/call`, forwarding only `arguments` to the named tool.
    async fn handle_tools_call(&self, ctx: RequestContext, params: Option<Value>) -> HandlerResult {
        let call: ToolCallParams = serde_json::from_value(params.unwrap_or(Value::Null))
            .map_err(|e| HandlerError::InvalidParams(e.to_string()))?;

        debug!(tool = %call.name, "calling tool");
        self.tools.invoke(&call.name, ctx, call.arguments).await
    }
}
