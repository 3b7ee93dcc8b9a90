//! Tool-specific error types.

use thiserror::Error;

/// Errors that can occur during tool registration and dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Invalid arguments were provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool ran and reported a domain-level failure.
    #[error("{0}")]
    Execution(String),

    /// The tool timed out during execution.
    #[error("Tool execution timed out: {0}")]
    Timeout(String),

    /// A tool with the same name is already registered.
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    /// A tool descriptor violates the tool contract.
    #[error("Invalid tool descriptor: {0}")]
    InvalidDescriptor(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "unknown tool" error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a new "execution failed" error.
    ///
    /// The message is returned to the caller verbatim.
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Create a new "timeout" error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a new "invalid descriptor" error.
    pub fn invalid_descriptor(msg: impl Into<String>) -> Self {
        Self::InvalidDescriptor(msg.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The error kind reported at the dispatch boundary.
    ///
    /// Registration-time errors never reach a caller through dispatch, so
    /// they fold into `InternalError`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownTool(_) => ErrorKind::UnknownTool,
            Self::InvalidArguments(_) => ErrorKind::InvalidArguments,
            Self::Execution(_) => ErrorKind::ToolExecutionError,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::DuplicateTool(_) | Self::InvalidDescriptor(_) | Self::Internal(_) => {
                ErrorKind::InternalError
            }
        }
    }
}

/// Error kinds surfaced in a dispatch envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    UnknownTool,
    InvalidArguments,
    ToolExecutionError,
    Timeout,
    InternalError,
}

impl ErrorKind {
    /// Wire name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownTool => "UnknownTool",
            Self::InvalidArguments => "InvalidArguments",
            Self::ToolExecutionError => "ToolExecutionError",
            Self::Timeout => "Timeout",
            Self::InternalError => "InternalError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_message_is_verbatim() {
        let err = ToolError::execution("target unreachable");
        assert_eq!(err.to_string(), "target unreachable");
        assert_eq!(err.kind(), ErrorKind::ToolExecutionError);
    }

    #[test]
    fn test_registration_errors_fold_into_internal() {
        assert_eq!(
            ToolError::DuplicateTool("echo".into()).kind(),
            ErrorKind::InternalError
        );
        assert_eq!(
            ToolError::invalid_descriptor("empty name").kind(),
            ErrorKind::InternalError
        );
    }

    #[test]
    fn test_kind_serializes_as_wire_name() {
        let json = serde_json::to_string(&ErrorKind::UnknownTool).unwrap();
        assert_eq!(json, "\"UnknownTool\"");
        assert_eq!(ErrorKind::Timeout.to_string(), "Timeout");
    }
}
