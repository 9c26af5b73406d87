//! MCP transports for hostmon.
//!
//! Both transports parse JSON-RPC framing and hand each message to the same
//! [`McpHandler`], which answers `initialize`, `ping`, `tools/list` and
//! `tools/call`. Tool discovery is generated from the core registry, so stdio
//! and HTTP clients always see the same catalogue.
//!
//! - [`stdio`]: newline-delimited messages on stdin/stdout.
//! - [`http`]: `POST /mcp` with CORS and a swappable runtime config, plus
//!   `GET /health`.

pub mod config;
pub mod error;
pub mod http;
pub mod jsonrpc;
pub mod mcp;
pub mod stdio;

pub use config::{ConfigError, ConfigStore, RuntimeConfig};
pub use error::FramingError;
pub use http::{AppState, build_router, run_http};
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use mcp::{McpHandler, PROTOCOL_VERSION};
pub use stdio::run_stdio;
