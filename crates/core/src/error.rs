//! Error types for the task list domain layer.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`StorageError`] - Database/repository errors
//! - [`PagingError`] - Cursor pagination errors
//! - [`DomainError`] - Task mutation and lookup errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Storage Errors
// =============================================================================

/// Database and repository errors.
///
/// These errors originate from storage operations like queries,
/// transactions, and data serialization.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to establish database connection.
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// Query execution failed.
    #[error("Query execution error: {0}")]
    QueryError(String),

    /// Requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Database constraint was violated (unique, not null, etc.).
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Database migration failed.
    #[error("Migration error: {0}")]
    MigrationError(String),

    /// Transaction commit/rollback failed.
    #[error("Transaction error: {0}")]
    TransactionError(String),

    /// Row decoding or value conversion failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// =============================================================================
// Paging Errors
// =============================================================================

/// Failure raised by a filter extension while augmenting a selection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ExtensionError(pub String);

impl ExtensionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors surfaced by the pagination engine.
///
/// `InvalidArgument` and `InvalidCursor` are client errors and never come
/// with partial results. `Storage` is a backend failure and is distinct
/// from an empty page, which is a valid connection.
#[derive(Debug, Error)]
pub enum PagingError {
    /// Malformed paging arguments (non-positive size, `first` with `last`).
    #[error("Invalid paging argument: {0}")]
    InvalidArgument(String),

    /// A cursor could not be decoded.
    #[error("Invalid cursor: {0:?}")]
    InvalidCursor(String),

    /// The filter extension refused to build the selection.
    #[error("Filter rejected: {0}")]
    FilterRejected(#[from] ExtensionError),

    /// The underlying store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl PagingError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PagingError::InvalidArgument(_) => "invalid_argument",
            PagingError::InvalidCursor(_) => "invalid_cursor",
            PagingError::FilterRejected(_) => "filter_rejected",
            PagingError::Storage(_) => "storage",
        }
    }

    /// Whether the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PagingError::Storage(_))
    }
}

// =============================================================================
// Domain Errors
// =============================================================================

/// Task lookup and mutation errors.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No task exists with the given id.
    #[error("Task not found: {0}")]
    TaskNotFound(i64),

    /// Input failed validation.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for pagination operations.
pub type PagingResult<T> = Result<T, PagingError>;

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
