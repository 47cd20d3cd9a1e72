use thiserror::Error;

/// Errors that end the server or abort its setup.
///
/// Per-request failures never surface here; they are turned into JSON-RPC
/// error responses by the protocol loop.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("config error: {message}")]
    Config { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results using `ServerError`.
pub type Result<T> = std::result::Result<T, ServerError>;
