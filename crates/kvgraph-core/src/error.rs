use thiserror::Error;

/// Canonical result for the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for graph construction and operator execution.
///
/// `Configuration`, `ShapeMismatch`, and `TypeMismatch` are raised at graph
/// build whenever static information suffices; `SourceNotFound` and `Parse`
/// can only surface while an import kernel runs.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("source not found: {0}")]
    SourceNotFound(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("hashing error: {0}")]
    Hash(String),

    #[error("internal invariant failed: {0}")]
    Invariant(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Hash(e.to_string())
    }
}
