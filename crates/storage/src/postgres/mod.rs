//! PostgreSQL storage adapter.
//!
//! This module implements the task repository port defined in
//! `tasklist-core` using PostgreSQL as the backing store.
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool and migrations
//! - [`PgTaskRepository`] - Task lookups, mutations and keyset paging
//! - `sql` - Whitelisted rendering of keyset queries
//!
//! # Usage
//!
//! ```ignore
//! let config = DatabaseConfig::for_graphql(&database_url);
//! let db = Database::connect(&config).await?;
//! db.migrate().await?;
//!
//! let tasks = PgTaskRepository::new(&db);
//! ```

mod database;
mod helpers;
mod sql;
mod task_repo;

pub use database::{Database, DatabaseConfig};
pub use sql::{TableDef, TASKS};
pub use task_repo::PgTaskRepository;
