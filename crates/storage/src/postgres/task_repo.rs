//! Task repository implementation for PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use tasklist_core::error::{DomainError, DomainResult, StorageError, StorageResult};
use tasklist_core::models::{NewTask, Task, TaskPatch};
use tasklist_core::pagination::{KeysetQuery, PageSource, Selection};
use tasklist_core::ports::TaskRepository;

use super::database::Database;
use super::helpers::query_error;
use super::sql::{select_count, select_exists, select_page, TASKS};

/// PostgreSQL implementation of [`TaskRepository`].
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl PageSource<Task> for PgTaskRepository {
    #[instrument(skip_all, fields(limit = ?query.limit, after = ?query.after, before = ?query.before))]
    async fn fetch(&self, query: &KeysetQuery) -> StorageResult<Vec<Task>> {
        let mut qb = select_page(&TASKS, query)?;
        let rows: Vec<TaskRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;

        debug!(rows = rows.len(), "Fetched task page");
        Ok(rows.into_iter().map(TaskRow::into_task).collect())
    }

    async fn exists(&self, query: &KeysetQuery) -> StorageResult<bool> {
        let mut qb = select_exists(&TASKS, query)?;
        let row = qb
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(row.is_some())
    }

    async fn count(&self, selection: &Selection) -> StorageResult<i64> {
        let mut qb = select_count(&TASKS, selection)?;
        let (count,): (i64,) = qb
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(count)
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn get_task(&self, id: i64) -> DomainResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, name, description, due_date, done, created_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(row.map(TaskRow::into_task))
    }

    #[instrument(skip_all)]
    async fn create_task(&self, task: NewTask) -> DomainResult<Task> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            INSERT INTO tasks (name, description, due_date, done)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, due_date, done, created_at
            "#,
        )
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.due_date)
        .bind(task.done)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(row.into_task())
    }

    /// Read-modify-write under a row lock, so concurrent patches to the same
    /// task apply one after the other.
    #[instrument(skip(self, patch))]
    async fn update_task(&self, id: i64, patch: TaskPatch) -> DomainResult<Task> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::TransactionError(e.to_string()))?;

        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, name, description, due_date, done, created_at
            FROM tasks
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(query_error)?;

        let Some(row) = row else {
            return Err(DomainError::TaskNotFound(id));
        };
        let mut task = row.into_task();
        patch.apply(&mut task);

        sqlx::query(
            r#"
            UPDATE tasks
            SET name = $1, description = $2, due_date = $3, done = $4
            WHERE id = $5
            "#,
        )
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.due_date)
        .bind(task.done)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;

        tx.commit()
            .await
            .map_err(|e| StorageError::TransactionError(e.to_string()))?;

        Ok(task)
    }

    async fn delete_task(&self, id: i64) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::TaskNotFound(id));
        }
        Ok(())
    }
}

/// Database row representation for Task.
#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    name: String,
    description: Option<String>,
    due_date: Option<DateTime<Utc>>,
    done: bool,
    created_at: DateTime<Utc>,
}

impl TaskRow {
    fn into_task(self) -> Task {
        Task {
            id: self.id,
            name: self.name,
            description: self.description,
            due_date: self.due_date,
            done: self.done,
            created_at: self.created_at,
        }
    }
}
