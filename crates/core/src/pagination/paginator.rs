//! Paging entry point.
//!
//! Runs the query builder, the materializer and both resolvers for one
//! request and assembles the [`Connection`].

use tracing::{debug, instrument};

use crate::error::PagingResult;
use crate::metrics::{record_page_served, record_paging_error, PageTimer};

use super::args::{PagingArguments, PagingConfig};
use super::builder::build_page_plan;
use super::connection::Connection;
use super::materializer::materialize;
use super::node::Node;
use super::page_info::resolve_page_info;
use super::query::FilterExtension;
use super::source::PageSource;
use super::total_count::resolve_total_count;

/// Stateless cursor paginator.
///
/// Holds only configuration; every call builds its own queries and keeps
/// nothing once the connection is returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct Paginator {
    config: PagingConfig,
}

impl Paginator {
    pub fn new(config: PagingConfig) -> Self {
        Self { config }
    }

    /// Resolve one page of `N` from `source`.
    pub async fn get_connection<N, S>(
        &self,
        source: &S,
        args: &PagingArguments,
        extension: Option<&dyn FilterExtension>,
    ) -> PagingResult<Connection<N>>
    where
        N: Node,
        S: PageSource<N> + ?Sized,
    {
        self.resolve(source, args, extension, false).await
    }

    /// Same as [`Paginator::get_connection`], with `total_count` filled in.
    pub async fn get_connection_with_total<N, S>(
        &self,
        source: &S,
        args: &PagingArguments,
        extension: Option<&dyn FilterExtension>,
    ) -> PagingResult<Connection<N>>
    where
        N: Node,
        S: PageSource<N> + ?Sized,
    {
        self.resolve(source, args, extension, true).await
    }

    #[instrument(skip_all, fields(first = ?args.first, last = ?args.last, with_total = with_total))]
    async fn resolve<N, S>(
        &self,
        source: &S,
        args: &PagingArguments,
        extension: Option<&dyn FilterExtension>,
        with_total: bool,
    ) -> PagingResult<Connection<N>>
    where
        N: Node,
        S: PageSource<N> + ?Sized,
    {
        let result = self.try_resolve(source, args, extension, with_total).await;
        if let Err(e) = &result {
            record_paging_error(e.kind());
            debug!(error = %e, "Paging request failed");
        }
        result
    }

    async fn try_resolve<N, S>(
        &self,
        source: &S,
        args: &PagingArguments,
        extension: Option<&dyn FilterExtension>,
        with_total: bool,
    ) -> PagingResult<Connection<N>>
    where
        N: Node,
        S: PageSource<N> + ?Sized,
    {
        let _timer = PageTimer::new();
        let plan = build_page_plan::<N>(args, &self.config, extension)?;

        // The count does not depend on the page, so it runs alongside it.
        let total = async {
            if with_total {
                resolve_total_count::<N, S>(source, &plan.selection)
                    .await
                    .map(Some)
            } else {
                Ok(None)
            }
        };
        let (page, total_count) = futures::try_join!(materialize::<N, S>(source, &plan), total)?;

        let page_info = resolve_page_info(source, &plan.selection, &plan.request, &page).await?;

        record_page_served(plan.request.direction.as_str());
        debug!(
            edges = page.edges.len(),
            has_previous = page_info.has_previous_page,
            has_next = page_info.has_next_page,
            total = ?total_count,
            "Connection resolved"
        );

        Ok(Connection {
            edges: page.edges,
            page_info,
            total_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::super::cursor::Cursor;
    use super::super::memory::MemorySource;
    use super::super::node::test_support::{items, Item};
    use super::super::query::{KeysetQuery, Predicate, Selection};
    use super::*;
    use crate::error::{ExtensionError, PagingError, StorageError, StorageResult};

    fn ids(conn: &Connection<Item>) -> Vec<i64> {
        conn.nodes().map(|n| n.id).collect()
    }

    fn range(from: i64, to: i64) -> Vec<i64> {
        (from..=to).collect()
    }

    /// Wraps a source and counts the queries it receives.
    struct Counting {
        inner: MemorySource<Item>,
        fetches: AtomicUsize,
        probes: AtomicUsize,
        counts: AtomicUsize,
    }

    impl Counting {
        fn new(n: i64) -> Self {
            Self {
                inner: MemorySource::from_rows(items(n)),
                fetches: AtomicUsize::new(0),
                probes: AtomicUsize::new(0),
                counts: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PageSource<Item> for Counting {
        async fn fetch(&self, query: &KeysetQuery) -> StorageResult<Vec<Item>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch(query).await
        }

        async fn exists(&self, query: &KeysetQuery) -> StorageResult<bool> {
            assert_eq!(query.limit, Some(1));
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.inner.exists(query).await
        }

        async fn count(&self, selection: &Selection) -> StorageResult<i64> {
            self.counts.fetch_add(1, Ordering::SeqCst);
            self.inner.count(selection).await
        }
    }

    struct Broken;

    #[async_trait]
    impl PageSource<Item> for Broken {
        async fn fetch(&self, _: &KeysetQuery) -> StorageResult<Vec<Item>> {
            Err(StorageError::ConnectionError("connection reset".into()))
        }

        async fn count(&self, _: &Selection) -> StorageResult<i64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_forward_from_start() {
        let source = MemorySource::from_rows(items(50));
        let conn = Paginator::default()
            .get_connection(&source, &PagingArguments::first(7), None)
            .await
            .unwrap();

        assert_eq!(ids(&conn), range(1, 7));
        assert!(!conn.page_info.has_previous_page);
        assert!(conn.page_info.has_next_page);
        assert_eq!(conn.page_info.start_cursor, Some(Cursor::from("1")));
        assert_eq!(conn.page_info.end_cursor, Some(Cursor::from("7")));
        assert_eq!(conn.total_count, None);
    }

    #[tokio::test]
    async fn test_backward_from_end() {
        let source = MemorySource::from_rows(items(50));
        let conn = Paginator::default()
            .get_connection(&source, &PagingArguments::last(7), None)
            .await
            .unwrap();

        assert_eq!(ids(&conn), range(44, 50));
        assert!(conn.page_info.has_previous_page);
        assert!(!conn.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_edges_carry_their_own_cursor() {
        let source = MemorySource::from_rows(items(5));
        let conn = Paginator::default()
            .get_connection(&source, &PagingArguments::last(3), None)
            .await
            .unwrap();
        for edge in &conn.edges {
            assert_eq!(edge.cursor.as_str(), edge.node.id.to_string());
        }
    }

    // Test critique: scénario de référence sur 10000 enregistrements
    #[tokio::test]
    async fn test_ten_thousand_records_scenario() {
        let source = MemorySource::from_rows(items(10_000));
        let paginator = Paginator::default();

        let first = paginator
            .get_connection_with_total(&source, &PagingArguments::first(15), None)
            .await
            .unwrap();
        assert_eq!(ids(&first), range(1, 15));
        assert!(!first.page_info.has_previous_page);
        assert_eq!(first.total_count, Some(10_000));

        let end = first.page_info.end_cursor.clone().unwrap();
        let second = paginator
            .get_connection_with_total(&source, &PagingArguments::first(15).after(end), None)
            .await
            .unwrap();
        assert_eq!(ids(&second), range(16, 30));
        assert!(second.page_info.has_previous_page);

        let tail = paginator
            .get_connection_with_total(&source, &PagingArguments::last(15), None)
            .await
            .unwrap();
        assert_eq!(ids(&tail), range(9986, 10_000));
        assert!(tail.page_info.has_previous_page);
        assert!(!tail.page_info.has_next_page);

        let start = tail.page_info.start_cursor.clone().unwrap();
        let before_tail = paginator
            .get_connection_with_total(&source, &PagingArguments::last(15).before(start), None)
            .await
            .unwrap();
        assert_eq!(ids(&before_tail), range(9971, 9985));
        assert!(before_tail.page_info.has_next_page);
        assert_eq!(before_tail.total_count, Some(10_000));
    }

    #[tokio::test]
    async fn test_forward_walk_has_no_gaps_or_overlap() {
        let source = MemorySource::from_rows(items(103));
        let paginator = Paginator::default();
        let mut seen = Vec::new();
        let mut args = PagingArguments::first(10);

        loop {
            let conn = paginator.get_connection(&source, &args, None).await.unwrap();
            if let (Some(last), Some(next)) = (seen.last().copied(), conn.nodes().next()) {
                assert_eq!(next.id, last + 1);
            }
            seen.extend(ids(&conn));
            if !conn.page_info.has_next_page {
                break;
            }
            args = PagingArguments::first(10).after(conn.page_info.end_cursor.unwrap());
        }

        assert_eq!(seen, range(1, 103));
    }

    #[tokio::test]
    async fn test_backward_walk_covers_everything() {
        let source = MemorySource::from_rows(items(25));
        let paginator = Paginator::default();
        let mut pages = Vec::new();
        let mut args = PagingArguments::last(10);

        loop {
            let conn = paginator.get_connection(&source, &args, None).await.unwrap();
            pages.push(ids(&conn));
            if !conn.page_info.has_previous_page {
                break;
            }
            args = PagingArguments::last(10).before(conn.page_info.start_cursor.unwrap());
        }

        assert_eq!(pages, vec![range(16, 25), range(6, 15), range(1, 5)]);
    }

    #[tokio::test]
    async fn test_same_request_is_idempotent() {
        let source = MemorySource::from_rows(items(40));
        let paginator = Paginator::default();
        let args = PagingArguments::first(6).after("12");

        let a = paginator
            .get_connection_with_total(&source, &args, None)
            .await
            .unwrap();
        let b = paginator
            .get_connection_with_total(&source, &args, None)
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_total_count_ignores_bounds_but_follows_filter() {
        let source = MemorySource::from_rows(items(30));
        let paginator = Paginator::default();

        for args in [
            PagingArguments::first(3),
            PagingArguments::last(4),
            PagingArguments::first(2).after("10"),
            PagingArguments::last(2).before("10"),
            PagingArguments::default().after("5").before("8"),
        ] {
            let conn = paginator
                .get_connection_with_total(&source, &args, None)
                .await
                .unwrap();
            assert_eq!(conn.total_count, Some(30));
        }

        let only_even = |s: Selection| -> Result<Selection, ExtensionError> {
            Ok(s.filter(Predicate::eq("even", true)))
        };
        let conn = paginator
            .get_connection_with_total(&source, &PagingArguments::first(3), Some(&only_even))
            .await
            .unwrap();
        assert_eq!(conn.total_count, Some(15));
        assert_eq!(ids(&conn), vec![2, 4, 6]);
    }

    #[tokio::test]
    async fn test_probes_respect_filter() {
        // Odd ids only: 1, 3, 5, 7, 9
        let source = MemorySource::from_rows(items(9));
        let only_odd = |s: Selection| -> Result<Selection, ExtensionError> {
            Ok(s.filter(Predicate::eq("even", false)))
        };
        let conn = Paginator::default()
            .get_connection(&source, &PagingArguments::last(5), Some(&only_odd))
            .await
            .unwrap();

        assert_eq!(ids(&conn), vec![1, 3, 5, 7, 9]);
        assert!(!conn.page_info.has_previous_page);
        assert!(!conn.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_alternative_ordering_key() {
        let source = MemorySource::from_rows(items(20));
        let by_rank = |s: Selection| -> Result<Selection, ExtensionError> {
            Ok(s.order_by_key("rank"))
        };
        let conn = Paginator::default()
            .get_connection(&source, &PagingArguments::first(3).after("50"), Some(&by_rank))
            .await
            .unwrap();

        assert_eq!(ids(&conn), vec![6, 7, 8]);
        assert_eq!(conn.page_info.start_cursor, Some(Cursor::from("60")));
        assert_eq!(conn.page_info.end_cursor, Some(Cursor::from("80")));
    }

    #[tokio::test]
    async fn test_empty_page_is_not_an_error() {
        let source = MemorySource::<Item>::new();
        let conn = Paginator::default()
            .get_connection_with_total(&source, &PagingArguments::first(5), None)
            .await
            .unwrap();

        assert!(conn.edges.is_empty());
        assert_eq!(conn.page_info.start_cursor, None);
        assert_eq!(conn.page_info.end_cursor, None);
        assert!(!conn.page_info.has_previous_page);
        assert!(!conn.page_info.has_next_page);
        assert_eq!(conn.total_count, Some(0));
    }

    #[tokio::test]
    async fn test_cursor_flags_skip_probes() {
        let source = Counting::new(100);
        let args = PagingArguments::first(10).after("20").before("90");
        let conn = Paginator::default()
            .get_connection(&source, &args, None)
            .await
            .unwrap();

        assert_eq!(ids(&conn), range(21, 30));
        assert!(conn.page_info.has_previous_page);
        assert!(conn.page_info.has_next_page);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(source.probes.load(Ordering::SeqCst), 0);
        assert_eq!(source.counts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_probes_issued_without_cursors() {
        let source = Counting::new(100);
        Paginator::default()
            .get_connection_with_total(&source, &PagingArguments::first(10), None)
            .await
            .unwrap();

        assert_eq!(source.probes.load(Ordering::SeqCst), 2);
        assert_eq!(source.counts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_page_issues_no_probes() {
        let source = Counting::new(10);
        let conn = Paginator::default()
            .get_connection(&source, &PagingArguments::first(5).after("10"), None)
            .await
            .unwrap();

        assert!(conn.edges.is_empty());
        // `after` was supplied, so has_previous is true without probing
        assert!(conn.page_info.has_previous_page);
        assert!(!conn.page_info.has_next_page);
        assert_eq!(source.probes.load(Ordering::SeqCst), 0);
    }

    /// Serves rows normally except for one kind of query.
    struct FailingOn {
        inner: MemorySource<Item>,
        fail_exists: bool,
        fail_count: bool,
    }

    #[async_trait]
    impl PageSource<Item> for FailingOn {
        async fn fetch(&self, query: &KeysetQuery) -> StorageResult<Vec<Item>> {
            self.inner.fetch(query).await
        }

        async fn exists(&self, query: &KeysetQuery) -> StorageResult<bool> {
            if self.fail_exists {
                return Err(StorageError::QueryError("exists failed".into()));
            }
            self.inner.exists(query).await
        }

        async fn count(&self, selection: &Selection) -> StorageResult<i64> {
            if self.fail_count {
                return Err(StorageError::QueryError("count failed".into()));
            }
            self.inner.count(selection).await
        }
    }

    // Test critique: une erreur sur les sondes ou le comptage remonte comme erreur de stockage
    #[tokio::test]
    async fn test_probe_and_count_failures_propagate() {
        let paginator = Paginator::default();

        let failing_exists = FailingOn {
            inner: MemorySource::from_rows(items(20)),
            fail_exists: true,
            fail_count: false,
        };
        for result in [
            paginator
                .get_connection(&failing_exists, &PagingArguments::first(5), None)
                .await,
            paginator
                .get_connection_with_total(&failing_exists, &PagingArguments::first(5), None)
                .await,
        ] {
            assert!(matches!(
                result.unwrap_err(),
                PagingError::Storage(StorageError::QueryError(_))
            ));
        }

        let failing_count = FailingOn {
            inner: MemorySource::from_rows(items(20)),
            fail_exists: false,
            fail_count: true,
        };
        // The count is only issued when the total is requested.
        assert!(paginator
            .get_connection(&failing_count, &PagingArguments::first(5), None)
            .await
            .is_ok());
        let err = paginator
            .get_connection_with_total(&failing_count, &PagingArguments::first(5), None)
            .await
            .unwrap_err();
        assert!(matches!(err, PagingError::Storage(StorageError::QueryError(_))));
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let err = Paginator::default()
            .get_connection::<Item, _>(&Broken, &PagingArguments::first(5), None)
            .await
            .unwrap_err();
        assert!(matches!(err, PagingError::Storage(StorageError::ConnectionError(_))));
    }

    #[tokio::test]
    async fn test_client_errors_surface_before_any_query() {
        let source = Counting::new(10);
        let paginator = Paginator::default();

        let err = paginator
            .get_connection(&source, &PagingArguments::first(0), None)
            .await
            .unwrap_err();
        assert!(matches!(err, PagingError::InvalidArgument(_)));

        let err = paginator
            .get_connection(&source, &PagingArguments::last(3).before("end"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, PagingError::InvalidCursor(_)));

        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    }
}
