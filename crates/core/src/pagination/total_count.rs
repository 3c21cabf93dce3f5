//! Total count resolver.

use tracing::trace;

use crate::error::PagingResult;

use super::node::Node;
use super::query::Selection;
use super::source::PageSource;

/// Count every record the selection would ever paginate over.
///
/// Paging bounds (`first`, `last`, `after`, `before`) play no part; the
/// result only depends on the base predicate and the filter extension.
/// Nothing is cached, callers re-issue this on every page.
pub async fn resolve_total_count<N, S>(source: &S, selection: &Selection) -> PagingResult<i64>
where
    N: Node,
    S: PageSource<N> + ?Sized,
{
    let total = source.count(selection).await?;
    trace!(total, "Total count resolved");
    Ok(total)
}
