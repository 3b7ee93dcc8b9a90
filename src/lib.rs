//! Santo MCP Server Library
//!
//! A Model Context Protocol (MCP) server whose tools are pluggable modules.
//! Each module registers one or more named tools with a declared parameter
//! schema; the server discovers enabled modules at startup and dispatches
//! calls to them through a single envelope-returning entry point.
//!
//! # Architecture
//!
//! - **core**: Configuration, error handling, the startup banner, the server
//!   handler and the transports (HTTP, STDIO, TCP)
//! - **domains**: Business logic organized by bounded contexts
//!   - **tools**: Tool contract, registry, discovery, dispatcher and the
//!     built-in tool modules
//!
//! # Example
//!
//! ```rust,no_run
//! use santo_mcp_server::core::{Config, McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let (server, _report) = McpServer::bootstrap(config)?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
pub use domains::tools::{Dispatcher, Envelope, InvocationRequest, ToolModule, ToolRegistry};
