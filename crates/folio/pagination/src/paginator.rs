use crate::cursor::{decode_cursor, encode_cursor};
use crate::{MembershipQuery, MembershipSource, PageError, PageResult, Visibility};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// One page of a category listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Raw content object ids, in listing order, each at most once.
    pub ids: Vec<u64>,
    pub has_next_page: bool,
    /// Resumes after the last id of this page. Present on every non-empty
    /// page, including the final one.
    pub next_cursor: Option<String>,
}

impl Page {
    /// Terminal empty page.
    pub fn empty() -> Self {
        Self {
            ids: Vec::new(),
            has_next_page: false,
            next_cursor: None,
        }
    }
}

/// Stateless keyset paginator over a [`MembershipSource`].
pub struct KeysetPaginator<S: ?Sized> {
    source: Arc<S>,
    visibility: Visibility,
}

impl<S: ?Sized> Clone for KeysetPaginator<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            visibility: self.visibility.clone(),
        }
    }
}

impl<S> KeysetPaginator<S>
where
    S: MembershipSource + ?Sized,
{
    pub fn new(source: Arc<S>, visibility: Visibility) -> Self {
        Self { source, visibility }
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    /// Fetch the page after `cursor` (or the first page) as of now.
    pub async fn request_page(
        &self,
        taxonomy_ids: &BTreeSet<u64>,
        page_size: usize,
        cursor: Option<&str>,
    ) -> PageResult<Page> {
        self.request_page_at(taxonomy_ids, page_size, cursor, Utc::now())
            .await
    }

    /// [`request_page`](Self::request_page) with an explicit visibility
    /// instant.
    pub async fn request_page_at(
        &self,
        taxonomy_ids: &BTreeSet<u64>,
        page_size: usize,
        cursor: Option<&str>,
        now: DateTime<Utc>,
    ) -> PageResult<Page> {
        let limit = page_size
            .checked_add(1)
            .filter(|_| page_size > 0)
            .ok_or(PageError::InvalidPageSize(page_size))?;
        let after = cursor.map(decode_cursor).transpose()?;

        if taxonomy_ids.is_empty() {
            return Ok(Page::empty());
        }

        let query = MembershipQuery {
            taxonomy_ids: taxonomy_ids.clone(),
            visibility: self.visibility.clone(),
            visible_at: now,
            after,
            limit,
        };
        let mut rows = self.source.fetch_memberships(&query).await?;

        if rows.is_empty() {
            debug!(taxonomies = taxonomy_ids.len(), "terminal empty page");
            return Ok(Page::empty());
        }

        let has_next_page = rows.len() > page_size;
        rows.truncate(page_size);
        let next_cursor = rows.last().map(encode_cursor);

        debug!(
            taxonomies = taxonomy_ids.len(),
            delivered = rows.len(),
            has_next_page,
            "served membership page"
        );

        Ok(Page {
            ids: rows.into_iter().map(|key| key.object_id).collect(),
            has_next_page,
            next_cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MembershipKey;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedRows {
        rows: Vec<MembershipKey>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MembershipSource for FixedRows {
        async fn fetch_memberships(
            &self,
            query: &MembershipQuery,
        ) -> PageResult<Vec<MembershipKey>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(query.select(self.rows.iter().copied()))
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset")]
    struct Reset;

    struct Failing;

    #[async_trait]
    impl MembershipSource for Failing {
        async fn fetch_memberships(&self, _: &MembershipQuery) -> PageResult<Vec<MembershipKey>> {
            Err(PageError::source(Reset))
        }
    }

    fn paginator(rows: Vec<MembershipKey>) -> (KeysetPaginator<FixedRows>, Arc<FixedRows>) {
        let source = Arc::new(FixedRows {
            rows,
            calls: AtomicUsize::new(0),
        });
        (
            KeysetPaginator::new(Arc::clone(&source), Visibility::default()),
            source,
        )
    }

    fn tags(ids: &[u64]) -> BTreeSet<u64> {
        ids.iter().copied().collect()
    }

    #[tokio::test]
    async fn empty_taxonomy_set_issues_no_query() {
        let (paginator, source) = paginator(vec![MembershipKey::new(1, 5)]);
        let page = paginator.request_page(&tags(&[]), 20, None).await.unwrap();
        assert_eq!(page, Page::empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_page_size_is_rejected() {
        let (paginator, _) = paginator(vec![]);
        let err = paginator.request_page(&tags(&[5]), 0, None).await.unwrap_err();
        assert!(matches!(err, PageError::InvalidPageSize(0)));
    }

    #[tokio::test]
    async fn malformed_cursor_fails_instead_of_restarting() {
        let (paginator, source) = paginator(vec![MembershipKey::new(1, 5)]);
        let err = paginator
            .request_page(&tags(&[5]), 20, Some("garbage"))
            .await
            .unwrap_err();
        assert!(matches!(err, PageError::InvalidCursor { .. }));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cursor_comes_from_last_delivered_row() {
        let rows = (1..=3).map(|id| MembershipKey::new(id, 5)).collect();
        let (paginator, _) = paginator(rows);
        let page = paginator.request_page(&tags(&[5]), 2, None).await.unwrap();
        assert_eq!(page.ids, vec![3, 2]);
        assert!(page.has_next_page);
        assert_eq!(page.next_cursor.as_deref(), Some("2//5"));
    }

    #[tokio::test]
    async fn exact_fit_has_no_next_page() {
        let rows = (1..=2).map(|id| MembershipKey::new(id, 5)).collect();
        let (paginator, _) = paginator(rows);
        let page = paginator.request_page(&tags(&[5]), 2, None).await.unwrap();
        assert_eq!(page.ids, vec![2, 1]);
        assert!(!page.has_next_page);
        assert_eq!(page.next_cursor.as_deref(), Some("1//5"));
    }

    #[tokio::test]
    async fn cursor_past_the_end_is_terminal() {
        let (paginator, _) = paginator(vec![MembershipKey::new(4, 5)]);
        let page = paginator
            .request_page(&tags(&[5]), 20, Some("1//5"))
            .await
            .unwrap();
        assert_eq!(page, Page::empty());
    }

    #[tokio::test]
    async fn source_errors_propagate() {
        let paginator = KeysetPaginator::new(Arc::new(Failing), Visibility::default());
        let err = paginator.request_page(&tags(&[5]), 20, None).await.unwrap_err();
        assert!(matches!(err, PageError::Source(_)));
        assert!(err.to_string().contains("connection reset"));
    }
}
