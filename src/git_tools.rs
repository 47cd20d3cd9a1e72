//! Git tools served by the `toolrpc` binary.
//!
//! Each tool shells out to `git` under the request context: when the
//! context expires the child process is killed. A non-zero git exit is not a
//! handler failure; the client receives git's stderr as the tool's text.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::process::Command;
use tracing::debug;

use crate::mcp::context::RequestContext;
use crate::mcp::handler::{handler_fn, HandlerError};
use crate::mcp::server::McpServer;
use crate::mcp::tools::Tool;
use crate::mcp::types::{InputSchema, Property, ToolCallResult};

pub const DEFAULT_LOG_COUNT: i64 = 3;
pub const MAX_LOG_COUNT: i64 = 50;

const CLEAN_STATUS_TEXT: &str = "Working directory is clean - no changes to commit.";
const EMPTY_LOG_TEXT: &str = "there are no logs";

/// Registers `git_status` and `git_log` on `server`.
pub fn register_git_tools(server: &mut McpServer, repo_dir: Option<PathBuf>) {
    server.add_tool(git_status_tool(repo_dir.clone()));
    server.add_tool(git_log_tool(repo_dir));
}

pub fn git_status_tool(repo_dir: Option<PathBuf>) -> Tool {
    Tool::new(
        "git_status",
        "show current git status",
        InputSchema::empty_object(),
        handler_fn(move |ctx, _args| {
            let repo_dir = repo_dir.clone();
            async move {
                run_git(
                    &ctx,
                    repo_dir,
                    &["status", "--porcelain=v1", "--branch"],
                    CLEAN_STATUS_TEXT,
                )
                .await
            }
        }),
    )
}

pub fn git_log_tool(repo_dir: Option<PathBuf>) -> Tool {
    Tool::new(
        "git_log",
        "Shows recent git commits with messages, authors, and dates",
        InputSchema::empty_object().property(
            "count",
            Property::new(
                "integer",
                format!("number of logs to show (default is {})", DEFAULT_LOG_COUNT),
            )
            .with_default(json!(DEFAULT_LOG_COUNT)),
        ),
        handler_fn(move |ctx, args| {
            let repo_dir = repo_dir.clone();
            async move {
                let count = log_count(args.as_ref())?.to_string();
                run_git(&ctx, repo_dir, &["log", "-n", count.as_str()], EMPTY_LOG_TEXT).await
            }
        }),
    )
}

#[derive(Debug, Deserialize)]
struct LogArgs {
    #[serde(default = "default_log_count")]
    count: i64,
}

fn default_log_count() -> i64 {
    DEFAULT_LOG_COUNT
}

/// Reads `count` from `git_log` arguments, clamped to `1..=MAX_LOG_COUNT`.
///
/// Missing or non-positive counts fall back to the default.
pub fn log_count(args: Option<&Value>) -> Result<i64, HandlerError> {
    let count = match args {
        None | Some(Value::Null) => DEFAULT_LOG_COUNT,
        Some(v) => {
            LogArgs::deserialize(v)
                .map_err(|e| HandlerError::InvalidParams(format!("invalid arguments: {}", e)))?
                .count
        }
    };

    Ok(match count {
        c if c <= 0 => DEFAULT_LOG_COUNT,
        c => c.min(MAX_LOG_COUNT),
    })
}

async fn run_git(
    ctx: &RequestContext,
    repo_dir: Option<PathBuf>,
    args: &[&str],
    empty_text: &str,
) -> Result<ToolCallResult, HandlerError> {
    let mut cmd = Command::new("git");
    cmd.args(args).kill_on_drop(true);
    if let Some(dir) = repo_dir {
        cmd.current_dir(dir);
    }

    debug!(?args, "running git");
    let output = ctx.run(cmd.output()).await?.map_err(|e| {
        HandlerError::internal(format!("failed to execute git {}: {}", args[0], e))
    })?;

    if !output.status.success() {
        return Ok(ToolCallResult::text(format!(
            "Error: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if stdout.is_empty() {
        Ok(ToolCallResult::text(empty_text))
    } else {
        Ok(ToolCallResult::text(stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_count_defaults() {
        assert_eq!(log_count(None).unwrap(), 3);
        assert_eq!(log_count(Some(&Value::Null)).unwrap(), 3);
        assert_eq!(log_count(Some(&json!({}))).unwrap(), 3);
        assert_eq!(log_count(Some(&json!({"count": 0}))).unwrap(), 3);
        assert_eq!(log_count(Some(&json!({"count": -4}))).unwrap(), 3);
    }

    #[test]
    fn test_log_count_clamps() {
        assert_eq!(log_count(Some(&json!({"count": 7}))).unwrap(), 7);
        assert_eq!(log_count(Some(&json!({"count": 500}))).unwrap(), 50);
    }

    #[test]
    fn test_log_count_rejects_bad_arguments() {
        let err = log_count(Some(&json!({"count": "many"}))).unwrap_err();
        assert!(matches!(err, HandlerError::InvalidParams(_)));
        assert!(err.to_string().contains("invalid arguments"));
    }

    #[tokio::test]
    async fn test_empty_output_uses_fallback_text() {
        let dir = tempfile::TempDir::new().unwrap();
        let init = std::process::Command::new("git")
            .args(["init", "--quiet"])
            .current_dir(dir.path())
            .status()
            .unwrap();
        assert!(init.success());

        let result = run_git(
            &RequestContext::default(),
            Some(dir.path().to_path_buf()),
            &["tag", "--list"],
            EMPTY_LOG_TEXT,
        )
        .await
        .unwrap();
        assert_eq!(result, ToolCallResult::text(EMPTY_LOG_TEXT));
    }

    #[test]
    fn test_git_log_schema() {
        let tool = git_log_tool(None);
        let count = &tool.definition.input_schema.properties["count"];
        assert_eq!(count.property_type, "integer");
        assert_eq!(count.default, Some(json!(3)));
        assert!(tool.definition.input_schema.required.is_empty());
    }
}
