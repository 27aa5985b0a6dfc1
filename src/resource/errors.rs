//! # Repository Errors

use thiserror::Error;

use crate::store::StoreError;
use crate::validation::Violation;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository errors
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// Payload rejected by the validation policy
    #[error("Validation errors in request body!")]
    ValidationFailed { errors: Vec<Violation> },

    /// No record with this id
    #[error("{resource} with id {id} not found!")]
    NotFound { resource: String, id: String },

    /// Underlying store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RepositoryError {
    pub fn not_found(resource: &str, id: &str) -> Self {
        RepositoryError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}
