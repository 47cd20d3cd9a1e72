use std::path::Path;
use std::process::Command;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;
use toolrpc::config::ServerConfig;
use toolrpc::git_tools::register_git_tools;
use toolrpc::mcp::McpServer;

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args([
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap()
        .status;
    assert!(status.success(), "git {:?} failed", args);
}

fn init_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    git(dir.path(), &["init", "--quiet"]);
    dir
}

fn commit(dir: &Path, message: &str) {
    git(dir, &["commit", "--quiet", "--allow-empty", "-m", message]);
}

fn server_in(dir: &Path) -> McpServer {
    let mut server = McpServer::new(ServerConfig::default().identity());
    register_git_tools(&mut server, Some(dir.to_path_buf()));
    server
}

async fn call_tool(server: &McpServer, name: &str, arguments: Value) -> Value {
    let line = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    })
    .to_string();
    let resp = server.handle_line(&line).await.unwrap();
    serde_json::to_value(resp).unwrap()
}

fn text(resp: &Value) -> &str {
    resp["result"]["content"][0]["text"].as_str().unwrap()
}

#[tokio::test]
async fn test_git_status_outside_repo_reports_git_error() {
    let dir = TempDir::new().unwrap();
    let resp = call_tool(&server_in(dir.path()), "git_status", json!({})).await;
    assert!(resp.get("error").is_none(), "{}", resp);
    assert_eq!(resp["result"]["content"][0]["type"], "text");
    assert!(text(&resp).starts_with("Error: fatal:"), "{}", resp);
}

#[tokio::test]
async fn test_git_status_in_fresh_repo() {
    let dir = init_repo();
    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    let resp = call_tool(&server_in(dir.path()), "git_status", json!({})).await;
    let status = text(&resp);
    assert!(status.starts_with("## "), "{}", status);
    assert!(status.contains("?? notes.txt"), "{}", status);
}

#[tokio::test]
async fn test_git_log_without_commits_reports_git_error() {
    let dir = init_repo();
    let resp = call_tool(&server_in(dir.path()), "git_log", json!({"count": 2})).await;
    assert!(resp.get("error").is_none(), "{}", resp);
    assert!(text(&resp).starts_with("Error: fatal:"), "{}", resp);
}

#[tokio::test]
async fn test_git_log_honours_count() {
    let dir = init_repo();
    commit(dir.path(), "first commit");
    commit(dir.path(), "second commit");
    let server = server_in(dir.path());

    let resp = call_tool(&server, "git_log", json!({"count": 1})).await;
    let log = text(&resp);
    assert!(log.contains("second commit"), "{}", log);
    assert!(!log.contains("first commit"), "{}", log);

    let resp = call_tool(&server, "git_log", Value::Null).await;
    let log = text(&resp);
    assert!(log.contains("first commit") && log.contains("second commit"));
}

#[tokio::test]
async fn test_git_log_rejects_bad_count() {
    let dir = init_repo();
    let resp = call_tool(&server_in(dir.path()), "git_log", json!({"count": "many"})).await;
    assert_eq!(resp["error"]["code"], -32603);
    assert!(resp["error"]["message"]
        .as_str()
        .unwrap()
        .contains("invalid arguments"));
}

#[tokio::test]
async fn test_git_tool_stops_at_request_deadline() {
    let dir = init_repo();
    let mut server = McpServer::new(ServerConfig::default().identity())
        .with_request_timeout(Duration::ZERO);
    register_git_tools(&mut server, Some(dir.path().to_path_buf()));

    let resp = call_tool(&server, "git_status", json!({})).await;
    assert_eq!(resp["error"]["code"], -32603);
    assert_eq!(resp["error"]["message"], "request deadline exceeded");
}
