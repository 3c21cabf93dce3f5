//! GraphQL type definitions.

use async_graphql::{EmptySubscription, Schema};

use crate::schema::{MutationRoot, QueryRoot};

/// The task list GraphQL schema type.
pub type TaskSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;
