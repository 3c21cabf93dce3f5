//! Page materializer.
//!
//! Executes the page query and turns rows into key-ascending edges.

use tracing::{debug, instrument};

use crate::error::PagingResult;

use super::builder::PagePlan;
use super::connection::Edge;
use super::cursor::encode_key;
use super::node::Node;
use super::source::PageSource;

/// Edges of one page plus the keys of its first and last rows.
#[derive(Debug, Clone)]
pub struct MaterializedPage<N> {
    pub edges: Vec<Edge<N>>,
    /// `(first, last)` ordering keys; `None` for an empty page.
    pub key_range: Option<(i64, i64)>,
}

impl<N> MaterializedPage<N> {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Run the plan's page query against `source`.
///
/// Tail pages come back newest-first and are reversed here, so edges are
/// always in ascending key order. Storage errors are not retried.
#[instrument(skip_all, fields(key = plan.query.key_field(), limit = plan.request.limit))]
pub async fn materialize<N, S>(source: &S, plan: &PagePlan) -> PagingResult<MaterializedPage<N>>
where
    N: Node,
    S: PageSource<N> + ?Sized,
{
    let mut rows = source.fetch(&plan.query).await?;

    if plan.is_tail() {
        rows.reverse();
    }

    let key_field = plan.query.key_field();
    let mut edges = Vec::with_capacity(rows.len());
    let mut first_key = None;
    let mut last_key = None;

    for node in rows {
        let key = node.ordering_key(key_field)?;
        first_key.get_or_insert(key);
        last_key = Some(key);
        edges.push(Edge {
            cursor: encode_key(key),
            node,
        });
    }

    debug!(rows = edges.len(), "Page materialized");

    Ok(MaterializedPage {
        edges,
        key_range: first_key.zip(last_key),
    })
}
