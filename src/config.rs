use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ServerError};
use crate::mcp::types::{Capabilities, ServerIdentity, ServerInfo};

/// Protocol revision advertised by default.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2025-06-18";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration for a toolrpc server.
///
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Protocol revision reported by `initialize`.
    pub protocol_version: String,
    /// Server name reported by `initialize`.
    pub server_name: String,
    /// Server version reported by `initialize`.
    pub server_version: String,
    /// Lifetime of each request's context.
    pub request_timeout_secs: u64,
    /// Working directory for the git tools; the process cwd when unset.
    pub repo_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            server_name: env!("CARGO_PKG_NAME").to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            repo_dir: None,
        }
    }
}

impl ServerConfig {
    /// Builds the identity advertised by `initialize`.
    pub fn identity(&self) -> ServerIdentity {
        ServerIdentity {
            protocol_version: self.protocol_version.clone(),
            capabilities: Capabilities::with_tools(),
            server_info: ServerInfo {
                name: self.server_name.clone(),
                version: self.server_version.clone(),
            },
        }
    }

    /// Lifetime of each request's context.
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

/// Loads the configuration from `path`.
///
/// If the file does not exist, returns the default configuration.
pub fn load_config(path: &Path) -> Result<ServerConfig> {
    if !path.exists() {
        return Ok(ServerConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(|e| ServerError::Config {
        message: format!("failed to read config file '{}': {}", path.display(), e),
    })?;

    serde_json::from_str(&contents).map_err(|e| ServerError::Config {
        message: format!("failed to parse config file '{}': {}", path.display(), e),
    })
}

/// Saves the configuration to `path` using an atomic write.
pub fn save_config(path: &Path, config: &ServerConfig) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ServerError::Config {
            message: format!(
                "failed to create config directory '{}': {}",
                parent.display(),
                e
            ),
        })?;
    }

    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(config).map_err(|e| ServerError::Config {
        message: format!("failed to serialize config: {}", e),
    })?;

    fs::write(&tmp_path, &json).map_err(|e| ServerError::Config {
        message: format!(
            "failed to write temporary config file '{}': {}",
            tmp_path.display(),
            e
        ),
    })?;

    fs::rename(&tmp_path, path).map_err(|e| ServerError::Config {
        message: format!(
            "failed to rename temporary config file '{}' to '{}': {}",
            tmp_path.display(),
            path.display(),
            e
        ),
    })?;

    Ok(())
}
