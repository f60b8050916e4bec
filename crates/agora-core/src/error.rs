//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: i64 },

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Forbidden")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Whether the failure came from a transaction abort or a store outage,
    /// in which case nothing was committed and the caller may retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::Conflict(_) | DomainError::Unavailable(_))
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// A write named a row that does not exist (foreign key violation).
    #[error("Missing referenced row: {0}")]
    MissingReference(String),

    #[error("Transaction aborted: {0}")]
    Serialization(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Connection(msg) => DomainError::Unavailable(msg),
            RepoError::Serialization(msg) => DomainError::Conflict(msg),
            // A concurrent writer claimed the same key first.
            RepoError::Constraint(msg) => DomainError::Conflict(msg),
            // Retrying cannot create the referenced row.
            RepoError::MissingReference(msg) => DomainError::InvalidArgument(msg),
            RepoError::NotFound => DomainError::Internal("row disappeared mid-operation".into()),
            RepoError::Query(msg) => DomainError::Internal(msg),
        }
    }
}
