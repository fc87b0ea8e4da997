//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::application::report::MergeCounts;
use crate::domain::DomainError;

/// Application errors wrap domain errors and add merge-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// An operation of the plan could not be applied. Earlier operations stay applied.
    #[error("internal inconsistency: {applied} of {total} operations applied before `{operation}` failed: {source}")]
    ExecutionFault {
        applied: usize,
        total: usize,
        operation: String,
        #[source]
        source: DomainError,
    },

    #[error("internal inconsistency: planned [{planned}] but realized [{realized}]")]
    CountMismatch {
        planned: MergeCounts,
        realized: MergeCounts,
    },

    #[error("duplicate bone names: {}", .names.join(", "))]
    DuplicateNames { names: Vec<String> },

    #[error("malformed document: {message}")]
    Wire { message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// True for faults that indicate a bug rather than bad input.
    pub fn is_internal_inconsistency(&self) -> bool {
        matches!(
            self,
            ApplicationError::ExecutionFault { .. } | ApplicationError::CountMismatch { .. }
        )
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
