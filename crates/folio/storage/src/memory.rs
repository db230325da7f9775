//! In-memory reference implementation of the content store traits.
//!
//! Deterministic and test-friendly. Seeding methods stand in for the CMS
//! that owns writes in production; the gateway itself never calls them.

use crate::model::{AttachmentRecord, AuthorRecord, MetaEntry, PostRecord};
use crate::traits::{ArticleStore, AuthorStore, MediaStore, PostScope};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use folio_pagination::{
    MembershipKey, MembershipQuery, MembershipSource, PageError, PageResult,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard};
use tracing::debug;

/// In-memory content store.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    posts: RwLock<HashMap<u64, PostRecord>>,
    memberships: RwLock<BTreeSet<MembershipKey>>,
    authors: RwLock<HashMap<u64, AuthorRecord>>,
    user_meta: RwLock<HashMap<(u64, String), MetaEntry>>,
    post_meta: RwLock<HashMap<(u64, String), MetaEntry>>,
    attachments: RwLock<HashMap<u64, AttachmentRecord>>,
}

fn read<'a, T>(lock: &'a RwLock<T>, what: &str) -> StorageResult<RwLockReadGuard<'a, T>> {
    lock.read()
        .map_err(|_| StorageError::Backend(format!("{what} lock poisoned")))
}

fn newest_first(posts: &mut [PostRecord]) {
    posts.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_post(&self, post: PostRecord) -> StorageResult<()> {
        let mut guard = self
            .posts
            .write()
            .map_err(|_| StorageError::Backend("posts lock poisoned".to_string()))?;
        guard.insert(post.id, post);
        Ok(())
    }

    /// Tag `object_id` with `term_taxonomy_id`. The pair is the row key, so
    /// re-adding it is a no-op.
    pub fn insert_membership(&self, object_id: u64, term_taxonomy_id: u64) -> StorageResult<()> {
        let mut guard = self
            .memberships
            .write()
            .map_err(|_| StorageError::Backend("memberships lock poisoned".to_string()))?;
        guard.insert(MembershipKey::new(object_id, term_taxonomy_id));
        Ok(())
    }

    pub fn insert_author(&self, author: AuthorRecord) -> StorageResult<()> {
        let mut guard = self
            .authors
            .write()
            .map_err(|_| StorageError::Backend("authors lock poisoned".to_string()))?;
        guard.insert(author.id, author);
        Ok(())
    }

    pub fn set_user_meta(&self, user_id: u64, key: &str, entry: MetaEntry) -> StorageResult<()> {
        let mut guard = self
            .user_meta
            .write()
            .map_err(|_| StorageError::Backend("user meta lock poisoned".to_string()))?;
        guard.insert((user_id, key.to_string()), entry);
        Ok(())
    }

    pub fn set_post_meta(&self, post_id: u64, key: &str, entry: MetaEntry) -> StorageResult<()> {
        let mut guard = self
            .post_meta
            .write()
            .map_err(|_| StorageError::Backend("post meta lock poisoned".to_string()))?;
        guard.insert((post_id, key.to_string()), entry);
        Ok(())
    }

    pub fn insert_attachment(&self, attachment: AttachmentRecord) -> StorageResult<()> {
        let mut guard = self
            .attachments
            .write()
            .map_err(|_| StorageError::Backend("attachments lock poisoned".to_string()))?;
        guard.insert(attachment.id, attachment);
        Ok(())
    }

    fn visible_posts(
        &self,
        scope: &PostScope,
        keep: impl Fn(&PostRecord) -> bool,
    ) -> StorageResult<Vec<PostRecord>> {
        let posts = read(&self.posts, "posts")?;
        let mut matched: Vec<PostRecord> = posts
            .values()
            .filter(|post| scope.admits(post) && keep(post))
            .cloned()
            .collect();
        newest_first(&mut matched);
        debug!(matched = matched.len(), "scanned in-memory posts");
        Ok(matched)
    }
}

#[async_trait]
impl MembershipSource for InMemoryContentStore {
    async fn fetch_memberships(&self, query: &MembershipQuery) -> PageResult<Vec<MembershipKey>> {
        let posts = read(&self.posts, "posts").map_err(PageError::source)?;
        let memberships = read(&self.memberships, "memberships").map_err(PageError::source)?;

        let visible = memberships.iter().copied().filter(|key| {
            posts.get(&key.object_id).is_some_and(|post| {
                query.visibility.admits(
                    &post.status,
                    &post.post_type,
                    post.published_at,
                    query.visible_at,
                )
            })
        });

        let rows = query.select(visible);
        debug!(
            taxonomies = query.taxonomy_ids.len(),
            rows = rows.len(),
            "selected in-memory memberships"
        );
        Ok(rows)
    }
}

#[async_trait]
impl ArticleStore for InMemoryContentStore {
    async fn find_post_by_slug(
        &self,
        slug: &str,
        scope: &PostScope,
    ) -> StorageResult<Option<PostRecord>> {
        Ok(self
            .visible_posts(scope, |post| post.slug == slug)?
            .into_iter()
            .next())
    }

    async fn find_posts_by_ids(
        &self,
        ids: &[u64],
        scope: &PostScope,
    ) -> StorageResult<Vec<PostRecord>> {
        self.visible_posts(scope, |post| ids.contains(&post.id))
    }

    async fn find_posts_by_authors(
        &self,
        author_ids: &[u64],
        scope: &PostScope,
    ) -> StorageResult<Vec<PostRecord>> {
        self.visible_posts(scope, |post| author_ids.contains(&post.author_id))
    }
}

#[async_trait]
impl AuthorStore for InMemoryContentStore {
    async fn find_author_by_id(&self, id: u64) -> StorageResult<Option<AuthorRecord>> {
        Ok(read(&self.authors, "authors")?.get(&id).cloned())
    }

    async fn find_author_by_slug(&self, slug: &str) -> StorageResult<Option<AuthorRecord>> {
        let authors = read(&self.authors, "authors")?;
        Ok(authors
            .values()
            .filter(|author| author.slug == slug)
            .min_by_key(|author| author.id)
            .cloned())
    }

    async fn user_meta(&self, user_id: u64, key: &str) -> StorageResult<Option<MetaEntry>> {
        let meta = read(&self.user_meta, "user meta")?;
        Ok(meta.get(&(user_id, key.to_string())).cloned())
    }
}

#[async_trait]
impl MediaStore for InMemoryContentStore {
    async fn post_meta(&self, post_id: u64, key: &str) -> StorageResult<Option<MetaEntry>> {
        let meta = read(&self.post_meta, "post meta")?;
        Ok(meta.get(&(post_id, key.to_string())).cloned())
    }

    async fn find_attachment(&self, id: u64) -> StorageResult<Option<AttachmentRecord>> {
        Ok(read(&self.attachments, "attachments")?.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use folio_pagination::Visibility;

    fn post(id: u64, author_id: u64, minutes: i64) -> PostRecord {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes);
        PostRecord {
            id,
            slug: format!("post-{id}"),
            title: format!("Post {id}"),
            content: "<p>body</p>".to_string(),
            author_id,
            status: "publish".to_string(),
            post_type: "post".to_string(),
            published_at: at,
            modified_at: at,
        }
    }

    fn scope() -> PostScope {
        PostScope::new(
            Visibility::default(),
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn slug_lookup_respects_visibility() {
        let store = InMemoryContentStore::new();
        store.insert_post(post(1, 10, 0)).unwrap();
        let mut draft = post(2, 10, 0);
        draft.status = "draft".to_string();
        store.insert_post(draft).unwrap();

        assert!(store.find_post_by_slug("post-1", &scope()).await.unwrap().is_some());
        assert!(store.find_post_by_slug("post-2", &scope()).await.unwrap().is_none());
        assert!(store.find_post_by_slug("post-3", &scope()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn scheduled_posts_are_hidden_until_due() {
        let store = InMemoryContentStore::new();
        let mut scheduled = post(1, 10, 0);
        scheduled.published_at = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        store.insert_post(scheduled).unwrap();

        assert!(store
            .find_posts_by_ids(&[1], &scope())
            .await
            .unwrap()
            .is_empty());
        let later = PostScope::new(
            Visibility::default(),
            Utc.with_ymd_and_hms(2030, 1, 2, 0, 0, 0).unwrap(),
        );
        assert_eq!(store.find_posts_by_ids(&[1], &later).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn author_posts_are_newest_first() {
        let store = InMemoryContentStore::new();
        store.insert_post(post(1, 10, 5)).unwrap();
        store.insert_post(post(2, 11, 10)).unwrap();
        store.insert_post(post(3, 12, 1)).unwrap();

        let posts = store
            .find_posts_by_authors(&[10, 11], &scope())
            .await
            .unwrap();
        let ids: Vec<u64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn memberships_skip_invisible_objects() {
        let store = InMemoryContentStore::new();
        store.insert_post(post(3, 10, 0)).unwrap();
        let mut page = post(2, 10, 0);
        page.post_type = "page".to_string();
        store.insert_post(page).unwrap();
        store.insert_membership(3, 5).unwrap();
        store.insert_membership(2, 5).unwrap();
        // dangling membership: no post row
        store.insert_membership(1, 5).unwrap();

        let query = MembershipQuery {
            taxonomy_ids: BTreeSet::from([5]),
            visibility: Visibility::default(),
            visible_at: scope().at,
            after: None,
            limit: 10,
        };
        let rows = store.fetch_memberships(&query).await.unwrap();
        assert_eq!(rows, vec![MembershipKey::new(3, 5)]);
    }

    #[tokio::test]
    async fn meta_distinguishes_missing_row_from_null_value() {
        let store = InMemoryContentStore::new();
        store
            .set_user_meta(10, "description", MetaEntry { value: None })
            .unwrap();

        assert_eq!(
            store.user_meta(10, "description").await.unwrap(),
            Some(MetaEntry { value: None })
        );
        assert_eq!(store.user_meta(11, "description").await.unwrap(), None);
    }
}
