//! Dispatcher - turns loosely-typed invocations into handler calls.
//!
//! Every dispatch answers with exactly one [`Envelope`]. Tool failures,
//! timeouts and even handler panics come back as data; nothing a tool does
//! can take down the serving loop.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use super::error::{ErrorKind, ToolError};
use super::registry::ToolRegistry;
use super::schema::validate_arguments;

/// Message returned to callers for internal faults. Details stay in the log.
const INTERNAL_ERROR_MESSAGE: &str = "Internal error while executing tool";

// ============================================================================
// Request / Envelope
// ============================================================================

/// An inbound invocation: tool name plus untyped argument map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// The name of the tool to execute.
    pub name: String,

    /// The arguments to pass to the tool.
    #[serde(default)]
    pub arguments: Value,
}

impl InvocationRequest {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Failure details inside an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

/// Uniform success/failure wrapper returned for every dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Whether the execution was successful.
    pub ok: bool,

    /// The tool's output on success.
    pub result: Option<String>,

    /// Failure details otherwise.
    pub error: Option<ErrorBody>,
}

impl Envelope {
    /// Create a successful envelope.
    pub fn success(result: impl Into<String>) -> Self {
        Self {
            ok: true,
            result: Some(result.into()),
            error: None,
        }
    }

    /// Create a failed envelope.
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(ErrorBody {
                kind,
                message: message.into(),
            }),
        }
    }

    /// Convert a tool error, hiding internal details.
    pub fn from_error(err: &ToolError) -> Self {
        match err.kind() {
            ErrorKind::InternalError => Self::failure(ErrorKind::InternalError, INTERNAL_ERROR_MESSAGE),
            ErrorKind::ToolExecutionError => {
                // Handler messages are passed through untouched.
                let ToolError::Execution(msg) = err else {
                    return Self::failure(ErrorKind::ToolExecutionError, err.to_string());
                };
                Self::failure(ErrorKind::ToolExecutionError, msg.clone())
            }
            kind => Self::failure(kind, err.to_string()),
        }
    }

    /// The error kind, if this is a failure.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }

    /// The text a client should display: the result or the error message.
    pub fn text(&self) -> &str {
        match (&self.result, &self.error) {
            (Some(result), _) => result,
            (None, Some(error)) => &error.message,
            (None, None) => "",
        }
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Aborts the wrapped task when dropped.
///
/// Dropping the dispatch future (client went away, timeout, cancellation)
/// therefore stops the tool, and a tool holding a kill-on-drop child process
/// terminates it.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Dispatcher - resolves tool names and runs handlers in isolation.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    default_timeout: Duration,
}

impl Dispatcher {
    /// Create a dispatcher over a populated registry.
    pub fn new(registry: Arc<ToolRegistry>, default_timeout: Duration) -> Self {
        Self {
            registry,
            default_timeout,
        }
    }

    /// The registry this dispatcher reads from.
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Dispatch one invocation.
    pub async fn dispatch(&self, request: InvocationRequest) -> Envelope {
        self.dispatch_until(request, std::future::pending()).await
    }

    /// Dispatch one invocation, aborting it when `cancelled` resolves.
    #[instrument(skip_all, fields(tool = %request.name))]
    pub async fn dispatch_until<C>(&self, request: InvocationRequest, cancelled: C) -> Envelope
    where
        C: Future<Output = ()>,
    {
        match self.invoke(&request.name, &request.arguments, cancelled).await {
            Ok(result) => {
                info!("Tool '{}' completed", request.name);
                Envelope::success(result)
            }
            Err(e) => {
                match e.kind() {
                    ErrorKind::InternalError => {
                        error!(tool = %request.name, arguments = %request.arguments, "Tool failed internally: {}", e)
                    }
                    ErrorKind::ToolExecutionError => info!("Tool '{}' reported failure: {}", request.name, e),
                    _ => warn!("Dispatch of '{}' rejected: {}", request.name, e),
                }
                Envelope::from_error(&e)
            }
        }
    }

    async fn invoke<C>(&self, name: &str, arguments: &Value, cancelled: C) -> Result<String, ToolError>
    where
        C: Future<Output = ()>,
    {
        let descriptor = self.registry.lookup(name)?;
        let args = validate_arguments(descriptor.parameters(), arguments)?;
        let timeout = descriptor.timeout_override().unwrap_or(self.default_timeout);

        let handler = descriptor.handler();
        let mut task = AbortOnDrop(tokio::spawn(async move { handler.call(args).await }));

        tokio::select! {
            joined = tokio::time::timeout(timeout, &mut task.0) => match joined {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(join_err)) if join_err.is_panic() => {
                    let panic = join_err.into_panic();
                    let detail = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "non-string panic payload".to_string());
                    Err(ToolError::internal(format!("handler panicked: {}", detail)))
                }
                Ok(Err(join_err)) => Err(ToolError::internal(format!("task failed: {}", join_err))),
                Err(_) => Err(ToolError::timeout(format!(
                    "'{}' did not finish within {:.1}s",
                    name,
                    timeout.as_secs_f64()
                ))),
            },
            _ = cancelled => {
                info!("Invocation of '{}' cancelled by client", name);
                Err(ToolError::internal("invocation cancelled"))
            }
        }
    }
}
