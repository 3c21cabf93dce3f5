//! GraphQL API for the task list service.
//!
//! Provides a GraphQL endpoint to list tasks with cursor pagination and
//! to create, update and delete them.
//!
//! # Usage
//!
//! ```ignore
//! use tasklist_graphql::{build_schema, serve_with_shutdown, ServerConfig};
//!
//! let schema = build_schema(task_service);
//! serve_with_shutdown(schema, ServerConfig::default(), shutdown).await?;
//! ```

mod errors;
mod schema;
mod server;
mod types;

pub use errors::{
    FILTER_REJECTED, INTERNAL, INVALID_ARGUMENT, INVALID_CURSOR, NOT_FOUND, VALIDATION_ERROR,
};
pub use schema::{
    build_schema, schema_builder, MutationRoot, PageInfo, QueryRoot, Task, TaskConnection,
    TaskEdge, TaskInput, MAX_QUERY_COMPLEXITY, MAX_QUERY_DEPTH,
};
pub use server::{router, serve_with_shutdown, ServerConfig};
pub use types::TaskSchema;
