//! Mapping of domain errors to GraphQL errors.
//!
//! Every error carries a stable `extensions.code`. Storage failures are
//! logged here and reach the client only as `INTERNAL`.

use async_graphql::{Error, ErrorExtensions};
use tracing::error;

use tasklist_core::error::{DomainError, PagingError};

pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
pub const INVALID_CURSOR: &str = "INVALID_CURSOR";
pub const FILTER_REJECTED: &str = "FILTER_REJECTED";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const INTERNAL: &str = "INTERNAL";

/// Build an error with the given `code` extension.
pub fn coded(message: impl Into<String>, code: &'static str) -> Error {
    Error::new(message).extend_with(|_, ext| ext.set("code", code))
}

pub fn invalid_argument(message: impl Into<String>) -> Error {
    coded(message, INVALID_ARGUMENT)
}

fn internal(cause: &dyn std::fmt::Display) -> Error {
    error!(error = %cause, "❌ Request failed on storage");
    coded("Internal server error", INTERNAL)
}

pub fn paging_error(err: PagingError) -> Error {
    match &err {
        PagingError::InvalidArgument(_) => coded(err.to_string(), INVALID_ARGUMENT),
        PagingError::InvalidCursor(_) => coded(err.to_string(), INVALID_CURSOR),
        PagingError::FilterRejected(_) => coded(err.to_string(), FILTER_REJECTED),
        PagingError::Storage(cause) => internal(cause),
    }
}

pub fn domain_error(err: DomainError) -> Error {
    match &err {
        DomainError::TaskNotFound(_) => coded(err.to_string(), NOT_FOUND),
        DomainError::ValidationError(_) => coded(err.to_string(), VALIDATION_ERROR),
        DomainError::Storage(cause) => internal(cause),
    }
}
