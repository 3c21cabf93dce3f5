//! Page query builder.
//!
//! Turns validated paging arguments plus an optional filter extension into
//! the bounded [`KeysetQuery`] for the page and the unbounded [`Selection`]
//! used by the probes and the total count.

use tracing::trace;

use crate::error::PagingResult;

use super::args::{PageDirection, PageRequest, PagingArguments, PagingConfig};
use super::connection::OrderDirection;
use super::node::Node;
use super::query::{FilterExtension, KeysetQuery, Selection};

/// Everything needed to answer one paging request.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub request: PageRequest,
    /// Filtered selection without any paging bounds.
    pub selection: Selection,
    /// The main page query.
    pub query: KeysetQuery,
}

impl PagePlan {
    /// Whether rows come back newest-first and must be reversed.
    pub fn is_tail(&self) -> bool {
        self.request.direction == PageDirection::Backward
    }
}

/// Build the plan for a page of `N`.
///
/// Arguments are validated (and cursors decoded) before the extension runs,
/// so a bad cursor never reaches caller code.
pub fn build_page_plan<N: Node>(
    args: &PagingArguments,
    config: &PagingConfig,
    extension: Option<&dyn FilterExtension>,
) -> PagingResult<PagePlan> {
    let request = args.validate(config)?;

    let mut selection = Selection::for_node::<N>();
    if let Some(extension) = extension {
        selection = extension.extend(selection)?;
    }
    selection.check_fields::<N>()?;

    // Tail pages are read newest-first so the limit cuts the right end.
    let direction = match request.direction {
        PageDirection::Forward => OrderDirection::Asc,
        PageDirection::Backward => OrderDirection::Desc,
    };

    let query = KeysetQuery {
        selection: selection.clone(),
        after: request.after,
        before: request.before,
        direction,
        limit: Some(request.limit),
    };

    trace!(
        key = query.key_field(),
        after = ?query.after,
        before = ?query.before,
        limit = request.limit,
        direction = request.direction.as_str(),
        "Built page query"
    );

    Ok(PagePlan {
        request,
        selection,
        query,
    })
}
