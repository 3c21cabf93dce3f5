//! Cursor-based pagination engine.
//!
//! Resolves Relay-style connections (`first`/`after`, `last`/`before`)
//! over any record type implementing [`Node`], using keyset queries on a
//! unique integer key. Storage stays behind the [`PageSource`] port.
//!
//! A request flows through:
//!
//! 1. [`PagingArguments::validate`] - argument checks, cursor decoding
//! 2. [`build_page_plan`] - selection, filter extension, page query
//! 3. [`materialize`] - page query, tail reversal, edges
//! 4. [`resolve_page_info`] - `LIMIT 1` probes for the page flags
//! 5. [`resolve_total_count`] - unbounded count, when requested

mod args;
mod builder;
mod connection;
mod cursor;
mod materializer;
mod memory;
mod node;
mod page_info;
mod paginator;
mod query;
mod source;
mod total_count;

pub use args::{
    PageDirection, PageRequest, PagingArguments, PagingConfig, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use builder::{build_page_plan, PagePlan};
pub use connection::{Connection, Edge, OrderDirection, PageInfo};
pub use cursor::{decode_key, encode_key, Cursor};
pub use materializer::{materialize, MaterializedPage};
pub use memory::MemorySource;
pub use node::{FieldValue, Node};
pub use page_info::resolve_page_info;
pub use paginator::Paginator;
pub use query::{CompareOp, FilterExtension, KeysetQuery, Predicate, Selection};
pub use source::PageSource;
pub use total_count::resolve_total_count;

#[cfg(test)]
pub(crate) use node::test_support;
