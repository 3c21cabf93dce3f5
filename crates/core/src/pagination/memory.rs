//! In-memory page source.
//!
//! Evaluates keyset queries over a vector of records. Used by the engine's
//! tests and by the server's in-memory mode.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StorageResult;

use super::connection::OrderDirection;
use super::node::Node;
use super::query::{KeysetQuery, Selection};
use super::source::PageSource;

/// Records held in memory, guarded by an async `RwLock`.
pub struct MemorySource<N> {
    rows: RwLock<Vec<N>>,
}

impl<N: Node> MemorySource<N> {
    pub fn new() -> Self {
        Self::from_rows(Vec::new())
    }

    pub fn from_rows(rows: Vec<N>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    pub async fn insert(&self, row: N) {
        self.rows.write().await.push(row);
    }

    /// Apply `f` to the first row whose key field equals `key`.
    ///
    /// Returns the updated row, or `None` when no row has that key.
    pub async fn update<T>(
        &self,
        key: i64,
        f: impl FnOnce(&mut N) -> T,
    ) -> StorageResult<Option<(N, T)>> {
        let mut rows = self.rows.write().await;
        for row in rows.iter_mut() {
            if row.ordering_key(N::KEY_FIELD)? == key {
                let out = f(row);
                return Ok(Some((row.clone(), out)));
            }
        }
        Ok(None)
    }

    /// Remove the row with the given key; returns whether one was removed.
    pub async fn remove(&self, key: i64) -> StorageResult<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        let mut failure = None;
        rows.retain(|row| match row.ordering_key(N::KEY_FIELD) {
            Ok(k) => k != key,
            Err(e) => {
                failure.get_or_insert(e);
                true
            }
        });
        if let Some(e) = failure {
            return Err(e);
        }
        Ok(rows.len() != before)
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

impl<N: Node> Default for MemorySource<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<N: Node> PageSource<N> for MemorySource<N> {
    async fn fetch(&self, query: &KeysetQuery) -> StorageResult<Vec<N>> {
        let rows = self.rows.read().await;
        let key_field = query.key_field();

        let mut keyed = Vec::new();
        for row in rows.iter() {
            let key = row.ordering_key(key_field)?;
            if query.admits(key) && query.selection.matches(row)? {
                keyed.push((key, row));
            }
        }

        keyed.sort_by_key(|(key, _)| *key);
        if query.direction == OrderDirection::Desc {
            keyed.reverse();
        }

        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        Ok(keyed
            .into_iter()
            .take(limit)
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn count(&self, selection: &Selection) -> StorageResult<i64> {
        let rows = self.rows.read().await;
        let mut total = 0;
        for row in rows.iter() {
            if selection.matches(row)? {
                total += 1;
            }
        }
        Ok(total)
    }
}
