//! Inference errors.

/// Errors raised by the inference API.
///
/// Detection itself never fails; only direct scoring calls that name a
/// column the table does not have are rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    #[error("Column '{column}' not found in table '{table}'")]
    UnknownColumn { table: String, column: String },
}

pub type InferenceResult<T> = Result<T, InferenceError>;
