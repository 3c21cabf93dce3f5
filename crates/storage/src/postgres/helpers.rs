//! Shared helpers for PostgreSQL error mapping and value conversion.

use sqlx::error::ErrorKind;

use tasklist_core::error::StorageError;

/// Map a sqlx error onto the storage error taxonomy.
///
/// Constraint failures keep their own variant so callers can tell a bad
/// write from a broken connection.
pub fn query_error(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::RowNotFound => StorageError::NotFound(e.to_string()),
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StorageError::ConnectionError(e.to_string())
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StorageError::SerializationError(e.to_string())
        }
        sqlx::Error::Database(db) => match db.kind() {
            ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation => StorageError::ConstraintViolation(e.to_string()),
            _ => StorageError::QueryError(e.to_string()),
        },
        _ => StorageError::QueryError(e.to_string()),
    }
}

/// Escape `%`, `_` and `\` so a user string matches literally inside `LIKE`.
pub fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
