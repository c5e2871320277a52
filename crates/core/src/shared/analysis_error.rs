use thiserror::Error;

/// Caller-input validation failures raised by the analysis engines.
///
/// None of these are transient: the same input always fails the same way,
/// so callers should fix the input rather than retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("embedding dimension mismatch for {subject}: expected {expected}, found {found}")]
    DimensionMismatch {
        subject: String,
        expected: usize,
        found: usize,
    },
    #[error("embedding for {subject} has zero or non-finite magnitude")]
    DegenerateEmbedding { subject: String },
    #[error("query has neither search text nor an embedding")]
    EmptyQuery,
    #[error("collage needs at least one column, got {0}")]
    InvalidColumnCount(usize),
    #[error("collage needs at least one row, got {0}")]
    InvalidRowCount(usize),
    #[error("analysis cancelled")]
    Cancelled,
}
