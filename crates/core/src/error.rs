/// Domain-level errors shared across the workspace.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The client submitted a task kind we have no script template for.
    #[error("Unsupported task kind: '{0}'")]
    UnsupportedKind(String),

    /// A task payload is structurally valid JSON but semantically wrong.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A registry write would clobber an existing correlation.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A filesystem operation failed (script output, directories).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
