//! Error types for the alignment engine

use thiserror::Error;

/// Main error type for alignment operations
#[derive(Error, Debug)]
pub enum AlignError {
    #[error("element '{0}' refers to unknown kind or has invalid geometry: {1}")]
    InvalidInput(String, String),

    #[error("vertex with non-finite coordinate in element '{0}' (vertex index {1})")]
    NonFiniteCoordinate(String, usize),

    #[error("no axis lines found on the {0} axis after fallback")]
    NoAxesFound(&'static str),

    #[error("duplicate element id '{0}'")]
    DuplicateElementId(u64),

    #[error("internal validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl AlignError {
    /// Stable process exit code per the error taxonomy (fatal conditions only)
    pub fn exit_code(&self) -> i32 {
        match self {
            AlignError::InvalidInput(..)
            | AlignError::NonFiniteCoordinate(..)
            | AlignError::DuplicateElementId(_) => 10,
            AlignError::NoAxesFound(_) => 20,
            AlignError::ValidationFailed(_) => 30,
            AlignError::IoError(_) | AlignError::SerializationError(_) => 1,
        }
    }
}

/// Result type for alignment operations
pub type AlignResult<T> = Result<T, AlignError>;
