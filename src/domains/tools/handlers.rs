//! Tool contract.
//!
//! Two traits make up what a loadable unit must provide:
//!
//! - [`ToolHandler`] is the callable behind one tool. It receives validated
//!   arguments and returns a string or a typed [`ToolError`].
//! - [`ToolModule`] is the registration entry point. Discovery hands it a
//!   registry and it registers zero or more tools.
//!
//! Both are checked at compile time; there is no runtime probing for an
//! entry point.

use std::future::Future;

use super::error::ToolError;
use super::registry::ToolRegistry;
use super::schema::ToolArgs;
use crate::core::config::Config;

/// Trait for implementing tool handlers.
///
/// Handlers may block on I/O but must do so asynchronously (tokio process,
/// network or timer APIs) or through `spawn_blocking`, so that a slow tool
/// never stalls unrelated invocations.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool with the given arguments.
    async fn call(&self, args: ToolArgs) -> Result<String, ToolError>;
}

#[async_trait::async_trait]
impl<F, Fut> ToolHandler for F
where
    F: Fn(ToolArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String, ToolError>> + Send + 'static,
{
    async fn call(&self, args: ToolArgs) -> Result<String, ToolError> {
        (self)(args).await
    }
}

/// A unit of tools that discovery can load.
pub trait ToolModule: Send + Sync {
    /// Module identifier, matched against the enabled-modules source.
    fn name(&self) -> &'static str;

    /// Register this module's tools.
    ///
    /// An error (or a panic) here drops every tool the module registered.
    fn register(&self, registry: &mut ToolRegistry, config: &Config) -> Result<(), ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_closure_is_a_handler() {
        let handler = |args: ToolArgs| async move { args.string("text") };
        let args = ToolArgs::from([("text", json!("hi"))]);

        let out = ToolHandler::call(&handler, args).await;
        assert_eq!(out, Ok("hi".to_string()));
    }

    #[tokio::test]
    async fn test_handler_error_passes_through() {
        let handler = |_args: ToolArgs| async move {
            Err::<String, _>(ToolError::execution("target unreachable"))
        };

        let out = ToolHandler::call(&handler, ToolArgs::default()).await;
        assert_eq!(out, Err(ToolError::execution("target unreachable")));
    }
}
