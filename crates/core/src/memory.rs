//! In-memory task repository.
//!
//! Backs the server's `--in-memory` mode and the GraphQL tests. Ids are
//! assigned from a monotonic counter, so they stay strictly increasing
//! even after deletes.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::error::{DomainError, DomainResult, StorageResult};
use crate::models::{NewTask, Task, TaskPatch};
use crate::pagination::{KeysetQuery, MemorySource, PageSource, Predicate, Selection};
use crate::ports::TaskRepository;

pub struct MemoryTaskRepository {
    rows: MemorySource<Task>,
    next_id: AtomicI64,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self {
            rows: MemorySource::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Repository pre-filled with tasks; ids continue after the largest one.
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next = tasks.iter().map(|t| t.id).max().unwrap_or(0).saturating_add(1);
        Self {
            rows: MemorySource::from_rows(tasks),
            next_id: AtomicI64::new(next),
        }
    }
}

impl Default for MemoryTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageSource<Task> for MemoryTaskRepository {
    async fn fetch(&self, query: &KeysetQuery) -> StorageResult<Vec<Task>> {
        self.rows.fetch(query).await
    }

    async fn exists(&self, query: &KeysetQuery) -> StorageResult<bool> {
        self.rows.exists(query).await
    }

    async fn count(&self, selection: &Selection) -> StorageResult<i64> {
        self.rows.count(selection).await
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskRepository {
    async fn get_task(&self, id: i64) -> DomainResult<Option<Task>> {
        let query = KeysetQuery {
            limit: Some(1),
            ..KeysetQuery::scan(Selection::new("id").filter(Predicate::eq("id", id)))
        };
        Ok(self.rows.fetch(&query).await?.into_iter().next())
    }

    async fn create_task(&self, task: NewTask) -> DomainResult<Task> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let task = task.into_task(id, Utc::now());
        self.rows.insert(task.clone()).await;
        debug!(id, "Task created");
        Ok(task)
    }

    async fn update_task(&self, id: i64, patch: TaskPatch) -> DomainResult<Task> {
        match self.rows.update(id, |task| patch.apply(task)).await? {
            Some((task, ())) => Ok(task),
            None => Err(DomainError::TaskNotFound(id)),
        }
    }

    async fn delete_task(&self, id: i64) -> DomainResult<()> {
        if self.rows.remove(id).await? {
            Ok(())
        } else {
            Err(DomainError::TaskNotFound(id))
        }
    }
}
