//! Greeting tool definition.
//!
//! A minimal tool, useful to check that a client can reach the server.

use tracing::info;

use crate::core::config::Config;
use crate::domains::tools::error::ToolError;
use crate::domains::tools::handlers::ToolModule;
use crate::domains::tools::registry::{ToolDescriptor, ToolRegistry};
use crate::domains::tools::schema::{ParamSpec, ParamType, ToolArgs};

/// Greeting tool module.
pub struct HelloModule;

impl HelloModule {
    /// Module name as matched by discovery.
    pub const MODULE: &'static str = "hellomcp";

    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "hellomcp";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Return a little hello string";

    /// Execute the tool logic.
    pub async fn execute(args: ToolArgs) -> Result<String, ToolError> {
        let full_name = args.string("full_name")?;
        info!("🔧 Tool called: hellomcp() by {}", full_name);
        Ok(format!("Hello {} !!", full_name))
    }
}

impl ToolModule for HelloModule {
    fn name(&self) -> &'static str {
        Self::MODULE
    }

    fn register(&self, registry: &mut ToolRegistry, _config: &Config) -> Result<(), ToolError> {
        registry.register(
            ToolDescriptor::new(Self::NAME, Self::DESCRIPTION, Self::execute).param(
                ParamSpec::required(
                    "full_name",
                    ParamType::String,
                    "User name for testing purposes",
                ),
            ),
        )
    }
}
