//! Transport layer for the MCP server.
//!
//! This module provides different transport implementations:
//! - **HTTP**: JSON-RPC over POST plus a plain `/invoke` endpoint (default) - feature: `http`
//! - **STDIO**: Standard input/output - feature: `stdio`
//! - **TCP**: Raw TCP socket with JSON-RPC messages - feature: `tcp`
//!
//! Each transport handles the connection lifecycle and hands every tool
//! call to the same dispatcher.
//!
//! # Feature Flags
//!
//! Transport implementations are conditionally compiled based on features:
//! - `http` (default): HTTP transport - adds axum, tower, tower-http
//! - `stdio`: STDIO transport - no extra dependencies
//! - `tcp`: TCP transport - adds tokio/net

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "tcp")]
pub mod tcp;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

// Re-export configs for convenience
#[cfg(feature = "tcp")]
pub use config::TcpConfig;

#[cfg(feature = "http")]
pub use config::HttpConfig;
