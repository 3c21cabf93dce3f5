//! Core domain layer for the task list service.
//!
//! This crate contains the cursor pagination engine, the task domain
//! models, the port traits (interfaces) and the task service. It follows
//! hexagonal architecture principles - this is the innermost layer with
//! no dependencies on infrastructure.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     tasklist (binary)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │       tasklist-graphql       │       tasklist-storage       │
//! │            (API)             │         (PostgreSQL)         │
//! ├──────────────────────────────┴──────────────────────────────┤
//! │                    tasklist-core  ← YOU ARE HERE            │
//! │        (pagination, models, ports, services, memory)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`pagination`] - Cursor pagination engine (Relay connections)
//! - [`models`] - Domain models (Task, patches, filters)
//! - [`ports`] - Interface traits for adapters to implement
//! - [`services`] - Task service (validation + paging)
//! - [`memory`] - In-memory repository
//! - [`error`] - Domain error types
//! - [`metrics`] - Prometheus metrics definitions
//!
//! # Key Concepts
//!
//! ## Keyset pagination
//!
//! Pages are cut from a filtered selection ordered by a unique integer
//! key. A cursor is the decimal form of that key, so resuming after a
//! cursor is a single `key > n` bound rather than an offset scan.
//! Backward pages (`last` without `first`) are read in descending order
//! and reversed, so edges always come back in ascending key order.
//!
//! ## Page flags
//!
//! `hasPreviousPage` and `hasNextPage` are answered with `LIMIT 1`
//! probes against the same selection. Supplying `after` (resp. `before`)
//! sets the matching flag without probing.
//!
//! ## Ports
//!
//! - [`pagination::PageSource`] - Bounded reads, probes and counts
//! - [`ports::TaskRepository`] - Task lookups and mutations

pub mod error;
pub mod memory;
pub mod metrics;
pub mod models;
pub mod pagination;
pub mod ports;
pub mod services;
