use thiserror::Error;

/// Errors raised by tool execution
///
/// These never propagate past the tool-dispatch boundary: the registry
/// converts every variant into a descriptive result string so the model can
/// respond to the failure instead of the whole request aborting.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool arguments were malformed or missing required fields
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool requires a credential that is not configured
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// The underlying API call or network operation failed
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}
