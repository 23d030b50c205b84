use thiserror::Error;

/// Failures produced by the transform engine.
///
/// Every lopdf-level error is caught and translated into one of these;
/// nothing below this layer is allowed to escape to callers.
#[derive(Error, Debug)]
pub enum TransformError {
    /// Request-shape problems: missing operation, no inputs, too few
    /// inputs for the operation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The tool name is not one of the implemented operations. A client
    /// error, surfaced verbatim.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// An input document failed to parse. Aborts the whole request.
    #[error("corrupt input document: {0}")]
    CorruptInput(String),

    /// Anything unexpected during execution or serialization.
    #[error("transform failed: {0}")]
    OperationFailed(String),
}
