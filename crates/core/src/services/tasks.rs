//! Task service - validation and paging on top of a [`TaskRepository`].

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::error::{DomainError, DomainResult, PagingResult};
use crate::models::{NewTask, Task, TaskFilter, TaskPatch};
use crate::pagination::{Connection, FilterExtension, Paginator, PagingArguments};
use crate::ports::TaskRepository;

// =============================================================================
// TaskService
// =============================================================================

/// Entry point used by the API layer.
///
/// Mutations are validated here before they reach the repository; list
/// requests go through the [`Paginator`].
#[derive(Clone)]
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
    paginator: Paginator,
}

impl TaskService {
    pub fn new(repository: Arc<dyn TaskRepository>, paginator: Paginator) -> Self {
        Self {
            repository,
            paginator,
        }
    }

    /// One page of tasks matching `filter`.
    #[instrument(skip(self, args), fields(done = ?filter.done))]
    pub async fn list_tasks(
        &self,
        args: &PagingArguments,
        filter: &TaskFilter,
        with_total: bool,
    ) -> PagingResult<Connection<Task>> {
        let extension = (!filter.is_empty()).then_some(filter as &dyn FilterExtension);
        let source = self.repository.as_ref();
        if with_total {
            self.paginator
                .get_connection_with_total(source, args, extension)
                .await
        } else {
            self.paginator.get_connection(source, args, extension).await
        }
    }

    pub async fn get_task(&self, id: i64) -> DomainResult<Option<Task>> {
        self.repository.get_task(id).await
    }

    #[instrument(skip_all)]
    pub async fn create_task(&self, task: NewTask) -> DomainResult<Task> {
        task.validate()?;
        let task = self.repository.create_task(task).await?;
        info!(id = task.id, "📝 Task created");
        Ok(task)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_task(&self, id: i64, patch: TaskPatch) -> DomainResult<Task> {
        patch.validate()?;
        if patch.is_empty() {
            debug!("Empty patch, returning current task");
            return self
                .repository
                .get_task(id)
                .await?
                .ok_or(DomainError::TaskNotFound(id));
        }
        self.repository.update_task(id, patch).await
    }

    #[instrument(skip(self))]
    pub async fn delete_task(&self, id: i64) -> DomainResult<()> {
        self.repository.delete_task(id).await?;
        info!(id, "🗑️  Task deleted");
        Ok(())
    }
}
