use thiserror::Error;

/// Convenience result type for reconciliation operations.
pub type ReconResult<T> = Result<T, ReconError>;

/// Error type returned by reconciliation entrypoints.
///
/// Only structural problems end up here. A malformed cell or a degenerate part number is
/// absorbed into a "no match" verdict and never aborts a run.
#[derive(Debug, Error)]
pub enum ReconError {
    /// An input table does not carry a column the reconciler needs.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// One of the two input tables was not supplied.
    #[error("missing input: {side} table was not provided")]
    MissingInput { side: &'static str },

    /// The policy cannot be applied (e.g. threshold outside 0..=100).
    #[error("invalid policy: {message}")]
    InvalidPolicy { message: String },

    /// Execution settings the engine cannot run with, or a thread pool that failed to start.
    #[error("invalid execution options: {message}")]
    InvalidExecution { message: String },

    /// Policy JSON could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}
