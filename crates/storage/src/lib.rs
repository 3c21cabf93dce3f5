//! Storage layer for the task list service.
//!
//! This crate provides the PostgreSQL implementation of the
//! `TaskRepository` port defined in `tasklist-core`. It handles connection
//! pooling, migrations, task CRUD and the keyset queries behind paging.
//!
//! # Usage
//!
//! ```ignore
//! use tasklist_storage::{Database, DatabaseConfig, PgTaskRepository};
//!
//! // Connect to the database
//! let config = DatabaseConfig::for_graphql(&database_url);
//! let db = Database::connect(&config).await?;
//!
//! // Run migrations
//! db.migrate().await?;
//!
//! // Create the repository
//! let tasks = Arc::new(PgTaskRepository::new(&db));
//! ```

pub mod postgres;

pub use postgres::{Database, DatabaseConfig, PgTaskRepository};
