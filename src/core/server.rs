//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler. It owns the dispatcher
//! built from the discovered tool registry and exposes it to every
//! transport.
//!
//! ## Tool Architecture
//!
//! Tool modules live in `domains/tools/definitions/`, one file per module.
//! At startup [`McpServer::bootstrap`] runs discovery, freezes the resulting
//! registry behind an `Arc` and builds both the HTTP dispatch path and the
//! rmcp ToolRouter from it.
//! **Adding a new tool does NOT require modifying this file!**

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;
use tracing::{info, warn};

use super::config::Config;
use super::error::{self, Error};
use super::transport::TransportService;
use crate::domains::tools::{
    DiscoveryReport, DiscoverySource, Dispatcher, Envelope, InvocationRequest, ModuleDiscoverer,
    build_tool_router, definitions,
};

/// Instructions advertised to clients on initialize.
pub const SERVER_INSTRUCTIONS: &str =
    "This server exposes pluggable tools. Call tools/list to see what is loaded.";

/// The main MCP server handler.
///
/// Cheap to clone; all clones share the same read-only registry.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Dispatcher over the frozen tool registry.
    dispatcher: Arc<Dispatcher>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a server around an already populated dispatcher.
    pub fn new(config: Config, dispatcher: Dispatcher) -> Self {
        let dispatcher = Arc::new(dispatcher);
        Self {
            tool_router: build_tool_router::<Self>(dispatcher.clone()),
            config: Arc::new(config),
            dispatcher,
        }
    }

    /// Run discovery over the built-in catalog and build the server.
    ///
    /// Discovery completes before the server exists, so no transport can ever
    /// observe a partially built registry.
    pub fn bootstrap(config: Config) -> error::Result<(Self, DiscoveryReport)> {
        validate_config(&config)?;
        for notice in &config.notices {
            warn!("{}", notice);
        }

        let source = DiscoverySource::from_config(&config.tools);
        info!("Discovering tool modules from {:?}", source);

        let discoverer = ModuleDiscoverer::new(definitions::catalog(), source);
        let (registry, report) = discoverer.discover(&config);

        let dispatcher = Dispatcher::new(Arc::new(registry), config.tools.timeout());
        Ok((Self::new(config, dispatcher), report))
    }

    /// Run the configured transport until it stops.
    pub async fn run(self) -> error::Result<()> {
        let transport = TransportService::new(self.config.transport.clone());
        transport.run(self).await?;
        Ok(())
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Get the dispatcher.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.dispatcher
            .registry()
            .list()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name(),
                    "description": t.description(),
                    "inputSchema": t.input_schema()
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    pub async fn call_tool(&self, name: &str, arguments: serde_json::Value) -> Envelope {
        self.dispatcher
            .dispatch(InvocationRequest::new(name, arguments))
            .await
    }
}

/// Reject configurations the server cannot start with.
fn validate_config(config: &Config) -> error::Result<()> {
    if config.server.name.trim().is_empty() {
        return Err(Error::config("server name must not be empty"));
    }
    if config.tools.timeout_secs == 0 {
        return Err(Error::config("MCP_TOOL_TIMEOUT_SECS must be at least 1"));
    }
    #[cfg(feature = "http")]
    {
        match &config.transport {
            super::transport::TransportConfig::Http(http) if !http.rpc_path.starts_with('/') => {
                return Err(Error::config(format!(
                    "MCP_HTTP_PATH must start with '/', got {:?}",
                    http.rpc_path
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
