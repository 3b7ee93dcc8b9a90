//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server:
//! how tool modules register, how the registry is built at startup, and how
//! inbound calls are dispatched to handlers.
//!
//! ## Architecture
//!
//! - `handlers.rs` - The tool contract (`ToolHandler`, `ToolModule`)
//! - `schema.rs` - Declared parameter schemas and argument validation
//! - `registry.rs` - Tool descriptors and the name to tool registry
//! - `discovery.rs` - Loads enabled modules, isolating per-module failures
//! - `dispatcher.rs` - Validates, runs and wraps every invocation
//! - `router.rs` - rmcp ToolRouter for STDIO/TCP transport
//! - `definitions/` - Built-in tool modules (one file per module)
//! - `error.rs` - Tool-specific error types

pub mod definitions;
pub mod discovery;
pub mod dispatcher;
mod error;
mod handlers;
mod registry;
pub mod router;
pub mod schema;

pub use discovery::{DiscoveryReport, DiscoverySource, LoadOutcome, ModuleDiscoverer, ModuleLoadResult};
pub use dispatcher::{Dispatcher, Envelope, ErrorBody, InvocationRequest};
pub use error::{ErrorKind, ToolError};
pub use handlers::{ToolHandler, ToolModule};
pub use registry::{ToolDescriptor, ToolRegistry};
pub use router::build_tool_router;
pub use schema::{ParamSpec, ParamType, ToolArgs};
