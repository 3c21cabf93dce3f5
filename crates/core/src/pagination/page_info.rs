//! Page info resolver.
//!
//! Answers has-previous / has-next with at most one `LIMIT 1` probe per
//! direction instead of counting the collection.

use tracing::trace;

use crate::error::PagingResult;
use crate::metrics::record_page_probe;

use super::args::PageRequest;
use super::connection::PageInfo;
use super::materializer::MaterializedPage;
use super::node::Node;
use super::query::{KeysetQuery, Selection};
use super::source::PageSource;

/// Compute page metadata for a materialized page.
///
/// Probes run against the same selection as the page (base predicate and
/// filter extension included) but without the request's bounds.
pub async fn resolve_page_info<N, S>(
    source: &S,
    selection: &Selection,
    request: &PageRequest,
    page: &MaterializedPage<N>,
) -> PagingResult<PageInfo>
where
    N: Node,
    S: PageSource<N> + ?Sized,
{
    let (has_previous_page, has_next_page) = futures::try_join!(
        has_previous(source, selection, request, page),
        has_next(source, selection, request, page),
    )?;

    Ok(PageInfo {
        has_next_page,
        has_previous_page,
        start_cursor: page.edges.first().map(|e| e.cursor.clone()),
        end_cursor: page.edges.last().map(|e| e.cursor.clone()),
    })
}

async fn has_previous<N, S>(
    source: &S,
    selection: &Selection,
    request: &PageRequest,
    page: &MaterializedPage<N>,
) -> PagingResult<bool>
where
    N: Node,
    S: PageSource<N> + ?Sized,
{
    // A client holding an `after` cursor has already seen earlier rows.
    if request.after.is_some() {
        return Ok(true);
    }
    let Some((first_key, _)) = page.key_range else {
        return Ok(false);
    };

    record_page_probe("previous");
    let probe = KeysetQuery::probe_before(selection.clone(), first_key);
    let found = source.exists(&probe).await?;
    trace!(first_key, found, "Previous page probe");
    Ok(found)
}

async fn has_next<N, S>(
    source: &S,
    selection: &Selection,
    request: &PageRequest,
    page: &MaterializedPage<N>,
) -> PagingResult<bool>
where
    N: Node,
    S: PageSource<N> + ?Sized,
{
    if request.before.is_some() {
        return Ok(true);
    }
    let Some((_, last_key)) = page.key_range else {
        return Ok(false);
    };

    record_page_probe("next");
    let probe = KeysetQuery::probe_after(selection.clone(), last_key);
    let found = source.exists(&probe).await?;
    trace!(last_key, found, "Next page probe");
    Ok(found)
}
