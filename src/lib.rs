pub mod config;
pub mod errors;
pub mod git_tools;
pub mod logging;
pub mod mcp;
