//! GraphQL schema definition.
//!
//! Exposes the task list: a Relay-style `tasks` connection, single task
//! lookup, and create/update/delete mutations.

use async_graphql::{
    Context, EmptySubscription, InputObject, MaybeUndefined, Object, Result, Schema, SchemaBuilder,
    ID,
};
use chrono::{DateTime, Utc};

use tasklist_core::models::{self, FieldUpdate, NewTask, TaskFilter, TaskPatch};
use tasklist_core::pagination::{Cursor, PagingArguments};
use tasklist_core::services::TaskService;

use crate::errors::{domain_error, invalid_argument, paging_error};
use crate::types::TaskSchema;

// -----------------------------------------------------------------------------
// Schema Configuration
// -----------------------------------------------------------------------------

/// Maximum query depth to prevent deeply nested queries (DoS protection).
/// Note: GraphQL introspection requires depth ~13, so we use 15 to allow it.
pub const MAX_QUERY_DEPTH: usize = 15;

/// Maximum query complexity score (DoS protection).
/// Each field has a default complexity of 1, nested objects multiply.
pub const MAX_QUERY_COMPLEXITY: usize = 500;

/// Maximum length of the `search` argument.
const MAX_SEARCH_LENGTH: usize = 128;

// -----------------------------------------------------------------------------
// Schema Builder
// -----------------------------------------------------------------------------

/// Build the task list schema, with depth and complexity limits.
pub fn build_schema(service: TaskService) -> TaskSchema {
    schema_builder(service)
        .limit_depth(MAX_QUERY_DEPTH)
        .limit_complexity(MAX_QUERY_COMPLEXITY)
        .finish()
}

/// Create a schema builder with the task service attached.
///
/// Remember to call `.limit_depth()` and `.limit_complexity()` before `.finish()`.
pub fn schema_builder(
    service: TaskService,
) -> SchemaBuilder<QueryRoot, MutationRoot, EmptySubscription> {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription).data(service)
}

// -----------------------------------------------------------------------------
// Query
// -----------------------------------------------------------------------------

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// List tasks, oldest first.
    ///
    /// `first`/`after` page forward, `last`/`before` page backward.
    /// `totalCount` is only computed when selected.
    #[allow(clippy::too_many_arguments)]
    async fn tasks<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        first: Option<i32>,
        after: Option<String>,
        last: Option<i32>,
        before: Option<String>,
        done: Option<bool>,
        search: Option<String>,
    ) -> Result<TaskConnection> {
        validate_search(&search)?;
        let service = ctx.data::<TaskService>()?;

        let args = PagingArguments {
            first,
            after: after.map(Cursor::from),
            last,
            before: before.map(Cursor::from),
        };
        let filter = TaskFilter { done, search };
        let with_total = ctx.look_ahead().field("totalCount").exists();

        let connection = service
            .list_tasks(&args, &filter, with_total)
            .await
            .map_err(paging_error)?;

        Ok(TaskConnection::from(connection))
    }

    /// Get a task by id.
    async fn task<'ctx>(&self, ctx: &Context<'ctx>, id: ID) -> Result<Option<Task>> {
        let service = ctx.data::<TaskService>()?;
        let task = service
            .get_task(parse_id(&id)?)
            .await
            .map_err(domain_error)?;
        Ok(task.map(Task::from))
    }
}

// -----------------------------------------------------------------------------
// Mutation
// -----------------------------------------------------------------------------

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_task<'ctx>(&self, ctx: &Context<'ctx>, task: TaskInput) -> Result<Task> {
        let service = ctx.data::<TaskService>()?;
        let created = service
            .create_task(task.into_new_task())
            .await
            .map_err(domain_error)?;
        Ok(Task::from(created))
    }

    /// Update the fields present in `patch`; explicit nulls clear a field.
    async fn update_task<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        id: ID,
        patch: TaskInput,
    ) -> Result<Task> {
        let service = ctx.data::<TaskService>()?;
        let updated = service
            .update_task(parse_id(&id)?, patch.into_patch())
            .await
            .map_err(domain_error)?;
        Ok(Task::from(updated))
    }

    /// Delete a task, returning its id.
    async fn delete_task<'ctx>(&self, ctx: &Context<'ctx>, id: ID) -> Result<ID> {
        let service = ctx.data::<TaskService>()?;
        let id = parse_id(&id)?;
        service.delete_task(id).await.map_err(domain_error)?;
        Ok(ID(id.to_string()))
    }
}

// -----------------------------------------------------------------------------
// GraphQL Types
// -----------------------------------------------------------------------------

/// Task type.
#[derive(async_graphql::SimpleObject)]
pub struct Task {
    pub id: ID,
    pub name: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

impl From<models::Task> for Task {
    fn from(t: models::Task) -> Self {
        Self {
            id: ID(t.id.to_string()),
            name: t.name,
            description: t.description,
            due_date: t.due_date,
            done: t.done,
            created_at: t.created_at,
        }
    }
}

/// Task fields for create and update.
///
/// On update, an omitted field is left unchanged and `null` clears it.
#[derive(InputObject, Default)]
pub struct TaskInput {
    pub name: MaybeUndefined<String>,
    pub description: MaybeUndefined<String>,
    pub due_date: MaybeUndefined<DateTime<Utc>>,
    pub done: MaybeUndefined<bool>,
}

impl TaskInput {
    /// Omitted and null both mean "not set" on create; a missing name is
    /// left to domain validation.
    fn into_new_task(self) -> NewTask {
        NewTask {
            name: self.name.take().unwrap_or_default(),
            description: self.description.take(),
            due_date: self.due_date.take(),
            done: self.done.take().unwrap_or(false),
        }
    }

    fn into_patch(self) -> TaskPatch {
        TaskPatch {
            name: field_update(self.name),
            description: field_update(self.description),
            due_date: field_update(self.due_date),
            done: field_update(self.done),
        }
    }
}

fn field_update<T>(value: MaybeUndefined<T>) -> FieldUpdate<T> {
    match value {
        MaybeUndefined::Undefined => FieldUpdate::Unchanged,
        MaybeUndefined::Null => FieldUpdate::Clear,
        MaybeUndefined::Value(v) => FieldUpdate::Set(v),
    }
}

// -----------------------------------------------------------------------------
// Connection Types (Relay-style pagination)
// -----------------------------------------------------------------------------

#[derive(async_graphql::SimpleObject)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

impl From<tasklist_core::pagination::PageInfo> for PageInfo {
    fn from(info: tasklist_core::pagination::PageInfo) -> Self {
        Self {
            has_next_page: info.has_next_page,
            has_previous_page: info.has_previous_page,
            start_cursor: info.start_cursor.map(|c| c.value),
            end_cursor: info.end_cursor.map(|c| c.value),
        }
    }
}

/// Generate Relay-style connection types (Edge + Connection) with From impl.
macro_rules! define_connection {
    ($node:ty, $core_model:ty, $edge:ident, $connection:ident) => {
        #[derive(async_graphql::SimpleObject)]
        pub struct $edge {
            pub node: $node,
            pub cursor: String,
        }

        #[derive(async_graphql::SimpleObject)]
        pub struct $connection {
            pub edges: Vec<$edge>,
            pub page_info: PageInfo,
            /// Size of the filtered collection, ignoring paging bounds.
            pub total_count: Option<i64>,
        }

        impl From<tasklist_core::pagination::Connection<$core_model>> for $connection {
            fn from(conn: tasklist_core::pagination::Connection<$core_model>) -> Self {
                let conn = conn.map(<$node>::from);
                Self {
                    edges: conn
                        .edges
                        .into_iter()
                        .map(|e| $edge {
                            node: e.node,
                            cursor: e.cursor.value,
                        })
                        .collect(),
                    page_info: PageInfo::from(conn.page_info),
                    total_count: conn.total_count,
                }
            }
        }
    };
}

define_connection!(Task, models::Task, TaskEdge, TaskConnection);

// -----------------------------------------------------------------------------
// Helpers & Validation
// -----------------------------------------------------------------------------

fn parse_id(id: &ID) -> Result<i64> {
    id.parse::<i64>()
        .map_err(|_| invalid_argument(format!("Invalid task id: {:?}", id.as_str())))
}

fn validate_search(search: &Option<String>) -> Result<()> {
    if let Some(value) = search {
        if value.chars().count() > MAX_SEARCH_LENGTH {
            return Err(invalid_argument(format!(
                "search too long: maximum {} characters allowed",
                MAX_SEARCH_LENGTH
            )));
        }
    }
    Ok(())
}
