//! Port trait for stores the paginator reads from.

use async_trait::async_trait;

use crate::error::StorageResult;

use super::node::Node;
use super::query::{KeysetQuery, Selection};

/// Read access to an ordered collection of `N`.
///
/// Implementations live in the infrastructure layer (e.g. `tasklist-storage`)
/// and must honour every part of a [`KeysetQuery`]: the selection's
/// predicates, the exclusive key bounds, the direction and the limit.
#[async_trait]
pub trait PageSource<N: Node>: Send + Sync {
    /// Rows matching the query, in the query's order, at most `limit` of them.
    async fn fetch(&self, query: &KeysetQuery) -> StorageResult<Vec<N>>;

    /// Whether at least one row matches the query.
    ///
    /// The default reads a single row; adapters may answer more cheaply.
    async fn exists(&self, query: &KeysetQuery) -> StorageResult<bool> {
        let probe = KeysetQuery {
            limit: Some(1),
            ..query.clone()
        };
        Ok(!self.fetch(&probe).await?.is_empty())
    }

    /// Number of rows in the selection, ignoring any paging bounds.
    async fn count(&self, selection: &Selection) -> StorageResult<i64>;
}
