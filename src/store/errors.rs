//! # Record Store Errors

use thiserror::Error;

/// Result type for record store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backing blob could not be read or written
    #[error("Store unavailable for '{resource}': {reason}")]
    Unavailable { resource: String, reason: String },

    /// The blob was read but is not a collection of records
    #[error("Corrupt data in '{resource}': {reason}")]
    CorruptData { resource: String, reason: String },
}

impl StoreError {
    pub fn unavailable(resource: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::Unavailable {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }

    pub fn corrupt(resource: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::CorruptData {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }

    /// Name of the collection the failure belongs to
    pub fn resource(&self) -> &str {
        match self {
            StoreError::Unavailable { resource, .. } => resource,
            StoreError::CorruptData { resource, .. } => resource,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_resource() {
        let err = StoreError::unavailable("books", "permission denied");
        assert_eq!(err.resource(), "books");
        assert!(err.to_string().contains("books"));
        assert!(err.to_string().contains("permission denied"));

        let err = StoreError::corrupt("users", "expected array");
        assert!(matches!(err, StoreError::CorruptData { .. }));
        assert_eq!(err.resource(), "users");
    }
}
