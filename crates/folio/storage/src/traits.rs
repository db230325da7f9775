use crate::model::{AttachmentRecord, AuthorRecord, MetaEntry, PostRecord};
use crate::StorageResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_pagination::{MembershipSource, Visibility};

/// Visibility predicate pinned to one instant, applied to post reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostScope {
    pub visibility: Visibility,
    pub at: DateTime<Utc>,
}

impl PostScope {
    pub fn new(visibility: Visibility, at: DateTime<Utc>) -> Self {
        Self { visibility, at }
    }

    /// Scope evaluated at the current instant.
    pub fn now(visibility: Visibility) -> Self {
        Self::new(visibility, Utc::now())
    }

    pub fn admits(&self, post: &PostRecord) -> bool {
        self.visibility
            .admits(&post.status, &post.post_type, post.published_at, self.at)
    }
}

/// Reads over visible posts.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Visible post with this slug.
    async fn find_post_by_slug(
        &self,
        slug: &str,
        scope: &PostScope,
    ) -> StorageResult<Option<PostRecord>>;

    /// Visible posts among `ids`, newest first. Missing ids are skipped.
    async fn find_posts_by_ids(
        &self,
        ids: &[u64],
        scope: &PostScope,
    ) -> StorageResult<Vec<PostRecord>>;

    /// Visible posts written by any of `author_ids`, newest first.
    async fn find_posts_by_authors(
        &self,
        author_ids: &[u64],
        scope: &PostScope,
    ) -> StorageResult<Vec<PostRecord>>;
}

/// Reads over author accounts.
#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn find_author_by_id(&self, id: u64) -> StorageResult<Option<AuthorRecord>>;
    async fn find_author_by_slug(&self, slug: &str) -> StorageResult<Option<AuthorRecord>>;
    async fn user_meta(&self, user_id: u64, key: &str) -> StorageResult<Option<MetaEntry>>;
}

/// Reads over post meta and media attachments.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn post_meta(&self, post_id: u64, key: &str) -> StorageResult<Option<MetaEntry>>;
    async fn find_attachment(&self, id: u64) -> StorageResult<Option<AttachmentRecord>>;
}

/// Unified store bundle used by the gateway.
pub trait ContentStore: MembershipSource + ArticleStore + AuthorStore + MediaStore + Send + Sync {}

impl<T> ContentStore for T where
    T: MembershipSource + ArticleStore + AuthorStore + MediaStore + Send + Sync
{
}
