//! Port traits for task storage.
//!
//! These traits define the storage interface used by the domain layer.
//! Implementations live in the infrastructure layer (e.g., `tasklist-storage`)
//! or in [`crate::memory`].

use async_trait::async_trait;

use crate::error::DomainResult;
use crate::models::{NewTask, Task, TaskPatch};
use crate::pagination::PageSource;

// =============================================================================
// Repository Traits
// =============================================================================

/// Repository for tasks.
///
/// Paging reads go through the [`PageSource`] supertrait; this trait adds
/// lookups and mutations.
#[async_trait]
pub trait TaskRepository: PageSource<Task> {
    /// Get task by id.
    async fn get_task(&self, id: i64) -> DomainResult<Option<Task>>;

    /// Insert a task and return it with its assigned id.
    async fn create_task(&self, task: NewTask) -> DomainResult<Task>;

    /// Apply a patch; fails with `TaskNotFound` for an unknown id.
    async fn update_task(&self, id: i64, patch: TaskPatch) -> DomainResult<Task>;

    /// Delete a task; fails with `TaskNotFound` for an unknown id.
    async fn delete_task(&self, id: i64) -> DomainResult<()>;
}
