//! Error types for permission resolution and association storage

use thiserror::Error;

use crate::types::{EntityKey, PermissionId};

/// Permission resolver errors
///
/// The resolver adds no failure modes of its own: everything here originates
/// in an association store and is propagated to the caller unchanged.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// An association references a permission that does not exist
    #[error("Foreign key violation: permission {permission_id} does not exist")]
    ForeignKeyViolation { permission_id: PermissionId },

    /// An association or permission already exists
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Store backend error
    #[error("Association store error for {key}: {message}")]
    StoreError { key: EntityKey, message: String },

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Result type for permission operations
pub type Result<T> = std::result::Result<T, AuthzError>;
