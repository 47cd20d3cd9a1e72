//! The unit of dispatch: a callable taking a request context and raw params.
//!
//! Built-in methods, user-registered methods and tool bodies all share the
//! [`Handler`] shape. Results stay unencoded until the protocol loop writes
//! the response, so an unencodable result is reported as its own error.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::context::RequestContext;
use super::transport::ErrorCode;

/// A failure returned by a handler or tool body.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("Unknown tool {0}")]
    ToolNotFound(String),

    #[error("request deadline exceeded")]
    DeadlineExceeded,

    #[error("request cancelled")]
    Cancelled,

    #[error("{0}")]
    Internal(String),

    /// A failure carrying its own JSON-RPC code.
    #[error("{message}")]
    Rpc { code: i32, message: String },
}

impl HandlerError {
    /// A generic failure reported with its message and the default code.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// JSON-RPC code reported to the client for this failure.
    pub fn code(&self) -> i32 {
        match self {
            Self::Rpc { code, .. } => *code,
            _ => ErrorCode::InternalError.as_i32(),
        }
    }
}

/// A handler result whose JSON encoding is deferred.
pub trait Encode: Send {
    fn encode(&self) -> serde_json::Result<Value>;
}

impl<T: Serialize + Send> Encode for T {
    fn encode(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Successful handler output.
pub type Reply = Box<dyn Encode>;

pub type HandlerResult = Result<Reply, HandlerError>;

pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;

/// A registered method or tool body.
pub type Handler = Arc<dyn Fn(RequestContext, Option<Value>) -> HandlerFuture + Send + Sync>;

/// Adapts an async closure returning any serializable value into a [`Handler`].
pub fn handler_fn<F, Fut, T>(f: F) -> Handler
where
    F: Fn(RequestContext, Option<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, HandlerError>> + Send + 'static,
    T: Serialize + Send + 'static,
{
    Arc::new(move |ctx: RequestContext, params: Option<Value>| -> HandlerFuture {
        let fut = f(ctx, params);
        Box::pin(async move { fut.await.map(|v| Box::new(v) as Reply) })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_handler_fn_boxes_result() {
        let h = handler_fn(|_ctx, params| async move { Ok(json!({ "echo": params })) });
        let reply = h(RequestContext::default(), Some(json!([1, 2])))
            .await
            .unwrap();
        assert_eq!(reply.encode().unwrap(), json!({"echo": [1, 2]}));
    }

    #[test]
    fn test_unencodable_reply() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], 1u8);
        let reply: Reply = Box::new(map);
        assert!(reply.encode().is_err());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(HandlerError::ToolNotFound("x".into()).code(), -32603);
        assert_eq!(HandlerError::InvalidParams("x".into()).code(), -32603);
        assert_eq!(HandlerError::DeadlineExceeded.code(), -32603);
        let custom = HandlerError::Rpc {
            code: -32001,
            message: "nope".into(),
        };
        assert_eq!(custom.code(), -32001);
        assert_eq!(custom.to_string(), "nope");
        assert_eq!(
            HandlerError::ToolNotFound("git_blame".into()).to_string(),
            "Unknown tool git_blame"
        );
    }
}
