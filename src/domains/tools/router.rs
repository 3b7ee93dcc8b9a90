//! Tool Router - builds the rmcp ToolRouter from the registry.
//!
//! Used by the STDIO and TCP transports. One route is created per registered
//! tool; every route forwards to the [`Dispatcher`], so validation, timeouts
//! and error handling are identical across transports.

use futures::FutureExt;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter},
    model::{CallToolResult, Content, JsonObject},
};
use serde_json::Value;
use std::sync::Arc;

use super::dispatcher::{Dispatcher, Envelope, InvocationRequest};
use super::registry::ToolDescriptor;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(dispatcher: Arc<Dispatcher>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    dispatcher
        .registry()
        .list()
        .iter()
        .fold(ToolRouter::new(), |router, descriptor| {
            router.with_route(create_route(descriptor, dispatcher.clone()))
        })
}

/// Create a ToolRoute that dispatches to `descriptor`.
fn create_route<S>(descriptor: &ToolDescriptor, dispatcher: Arc<Dispatcher>) -> ToolRoute<S>
where
    S: Send + Sync + 'static,
{
    let name = descriptor.name().to_string();
    ToolRoute::new_dyn(descriptor.to_tool(), move |ctx: ToolCallContext<'_, S>| {
        let arguments = ctx.arguments.clone();
        let ct = ctx.request_context.ct.clone();
        let dispatcher = dispatcher.clone();
        let name = name.clone();
        async move { Ok(call_route(dispatcher, name, arguments, ct.cancelled()).await) }.boxed()
    })
}

/// Body of every route: MCP arguments in, MCP tool result out.
///
/// Missing arguments are passed on as `null`, which validation treats as an
/// empty object.
async fn call_route<C>(
    dispatcher: Arc<Dispatcher>,
    name: String,
    arguments: Option<JsonObject>,
    cancelled: C,
) -> CallToolResult
where
    C: Future<Output = ()>,
{
    let arguments = arguments.map(Value::Object).unwrap_or(Value::Null);
    let request = InvocationRequest::new(name, arguments);
    let envelope = dispatcher.dispatch_until(request, cancelled).await;
    to_call_tool_result(&envelope)
}

/// Convert an envelope into an MCP tool result.
pub fn to_call_tool_result(envelope: &Envelope) -> CallToolResult {
    match envelope.kind() {
        None => CallToolResult::success(vec![Content::text(envelope.text().to_string())]),
        Some(kind) => CallToolResult::error(vec![Content::text(format!(
            "[{}] {}",
            kind,
            envelope.text()
        ))]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::error::ErrorKind;
    use crate::domains::tools::registry::ToolRegistry;
    use crate::domains::tools::schema::{ParamSpec, ParamType, ToolArgs};
    use serde_json::json;
    use std::time::Duration;

    struct TestServer {}

    fn test_dispatcher() -> Arc<Dispatcher> {
        let mut registry = ToolRegistry::new();
        for name in ["beta", "alpha"] {
            registry
                .register_fn(name, "t", vec![], |_args: ToolArgs| async move {
                    Ok("ok".to_string())
                })
                .unwrap();
        }
        Arc::new(Dispatcher::new(Arc::new(registry), Duration::from_secs(5)))
    }

    fn routed_dispatcher() -> Arc<Dispatcher> {
        let mut registry = ToolRegistry::new();
        registry
            .register_fn(
                "echo",
                "Echoes its text",
                vec![ParamSpec::required("text", ParamType::String, "Text to echo")],
                |args: ToolArgs| async move { args.string("text") },
            )
            .unwrap();
        registry
            .register_fn("sleepy", "Never finishes in time", vec![], |_args: ToolArgs| async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(String::new())
            })
            .unwrap();
        Arc::new(Dispatcher::new(Arc::new(registry), Duration::from_secs(60)))
    }

    fn result_text(result: &CallToolResult) -> &str {
        match &result.content[0].raw {
            rmcp::model::RawContent::Text(text) => &text.text,
            _ => panic!("Expected text content"),
        }
    }

    #[test]
    fn test_build_router() {
        let router: ToolRouter<TestServer> = build_tool_router(test_dispatcher());
        let tools = router.list_all();
        assert_eq!(tools.len(), 2);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(names.contains(&"alpha"));
        assert!(names.contains(&"beta"));
    }

    #[test]
    fn test_registry_matches_router() {
        let dispatcher = test_dispatcher();
        let registry_names: Vec<String> = dispatcher
            .registry()
            .tool_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let router: ToolRouter<TestServer> = build_tool_router(dispatcher);
        let router_tools = router.list_all();
        let router_names: Vec<_> = router_tools.iter().map(|t| t.name.as_ref()).collect();

        assert_eq!(registry_names.len(), router_names.len());
        for name in &registry_names {
            assert!(router_names.contains(&name.as_str()));
        }
    }

    #[test]
    fn test_envelope_to_call_tool_result() {
        let ok = to_call_tool_result(&Envelope::success("hi"));
        assert_eq!(ok.is_error, Some(false));

        let failed = to_call_tool_result(&Envelope::failure(
            ErrorKind::ToolExecutionError,
            "target unreachable",
        ));
        assert_eq!(failed.is_error, Some(true));
        assert_eq!(result_text(&failed), "[ToolExecutionError] target unreachable");
    }

    #[tokio::test]
    async fn test_route_passes_arguments() {
        let arguments = json!({"text": "hello"}).as_object().cloned();
        let result = call_route(
            routed_dispatcher(),
            "echo".to_string(),
            arguments,
            std::future::pending(),
        )
        .await;

        assert_eq!(result.is_error, Some(false));
        assert_eq!(result_text(&result), "hello");
    }

    #[tokio::test]
    async fn test_route_without_arguments() {
        let result = call_route(
            routed_dispatcher(),
            "echo".to_string(),
            None,
            std::future::pending(),
        )
        .await;

        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).starts_with("[InvalidArguments]"));
    }

    #[tokio::test]
    async fn test_route_cancelled() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let call = tokio::spawn(call_route(
            routed_dispatcher(),
            "sleepy".to_string(),
            None,
            async move {
                let _ = rx.await;
            },
        ));

        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(()).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), call)
            .await
            .expect("cancelled route should finish promptly")
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(result_text(&result).starts_with("[InternalError]"));
    }
}
