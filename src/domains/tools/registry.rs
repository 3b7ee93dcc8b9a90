//! Tool Registry - central registration and lookup for all tools.
//!
//! This module provides:
//! - [`ToolDescriptor`], the identity and behaviour of one tool
//! - [`ToolRegistry`], the name to descriptor mapping built during discovery
//!
//! Duplicate names are rejected, never overwritten. Listing is sorted by
//! tool name.

use rmcp::model::Tool;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::error::ToolError;
use super::handlers::ToolHandler;
use super::schema::{ParamSpec, check_params, input_schema};

// ============================================================================
// Tool Descriptor
// ============================================================================

/// A registered tool: name, documentation, parameter schema and handler.
#[derive(Clone)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    params: Vec<ParamSpec>,
    handler: Arc<dyn ToolHandler>,
    timeout: Option<Duration>,
}

impl ToolDescriptor {
    /// Create a descriptor with no parameters.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: impl ToolHandler + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
            handler: Arc::new(handler),
            timeout: None,
        }
    }

    /// Append a parameter declaration.
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Replace the parameter list.
    pub fn params(mut self, params: Vec<ParamSpec>) -> Self {
        self.params = params;
        self
    }

    /// Override the dispatcher's default invocation timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn handler(&self) -> Arc<dyn ToolHandler> {
        self.handler.clone()
    }

    pub fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }

    /// JSON Schema for the tool's arguments.
    pub fn input_schema(&self) -> serde_json::Map<String, serde_json::Value> {
        input_schema(&self.params)
    }

    /// Create a Tool model for this descriptor (metadata).
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.clone().into(),
            description: Some(self.description.clone().into()),
            input_schema: Arc::new(self.input_schema()),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    fn check(&self) -> Result<(), ToolError> {
        if self.name.trim().is_empty() {
            return Err(ToolError::invalid_descriptor("tool name must not be empty"));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(ToolError::invalid_descriptor(format!(
                "tool '{}' has a zero timeout",
                self.name
            )));
        }
        check_params(&self.params)
            .map_err(|e| ToolError::invalid_descriptor(format!("tool '{}': {}", self.name, e)))
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("params", &self.params)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - maps tool names to descriptors.
///
/// Built sequentially during discovery, then shared read-only behind an
/// `Arc`; concurrent lookups need no locking.
#[derive(Debug, Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<ToolDescriptor>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails on contract violations and duplicate names.
    pub fn register(&mut self, descriptor: ToolDescriptor) -> Result<(), ToolError> {
        descriptor.check()?;
        if self.tools.contains_key(&descriptor.name) {
            return Err(ToolError::DuplicateTool(descriptor.name));
        }
        debug!("Registering tool: {}", descriptor.name);
        self.tools
            .insert(descriptor.name.clone(), Arc::new(descriptor));
        Ok(())
    }

    /// Register a tool from its parts.
    pub fn register_fn(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        params: Vec<ParamSpec>,
        handler: impl ToolHandler + 'static,
    ) -> Result<(), ToolError> {
        self.register(ToolDescriptor::new(name, description, handler).params(params))
    }

    /// Move every tool of `staged` into this registry.
    ///
    /// All-or-nothing: if any name collides, nothing is merged.
    pub fn absorb(&mut self, staged: ToolRegistry) -> Result<usize, ToolError> {
        if let Some(dup) = staged.tools.keys().find(|name| self.tools.contains_key(*name)) {
            return Err(ToolError::DuplicateTool(dup.clone()));
        }
        let count = staged.tools.len();
        self.tools.extend(staged.tools);
        Ok(count)
    }

    /// Look up a tool by name.
    pub fn lookup(&self, name: &str) -> Result<Arc<ToolDescriptor>, ToolError> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::unknown_tool(name))
    }

    /// All descriptors, sorted by name.
    pub fn list(&self) -> Vec<Arc<ToolDescriptor>> {
        self.tools.values().cloned().collect()
    }

    /// All tool names, sorted.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
