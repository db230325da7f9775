//! Content service: the read operations the public API resolves through.
//!
//! Raw integer keys stay inside this module. Every article and author that
//! leaves it carries opaque ids from the shared [`IdCodecs`], and article
//! authors are folded onto their canonical account first.
//!
//! [`IdCodecs`]: folio_ids::IdCodecs

use crate::context::GatewayContext;
use crate::links::rewrite_media_url;
use crate::model::{text_or_none, Article, ArticlesEdge, Author, Image};
use crate::{GatewayError, GatewayResult};
use folio_ids::IdNamespace;
use folio_pagination::KeysetPaginator;
use folio_storage::{
    ArticleStore, AuthorRecord, AuthorStore, ContentStore, MediaStore, PostRecord, PostScope,
    ATTACHMENT_ALT_META_KEY, AUTHOR_BIO_META_KEY, THUMBNAIL_META_KEY,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Read-side content operations over a [`ContentStore`].
#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn ContentStore>,
    paginator: KeysetPaginator<dyn ContentStore>,
    context: Arc<GatewayContext>,
}

impl ContentService {
    pub fn new(store: Arc<dyn ContentStore>, context: Arc<GatewayContext>) -> Self {
        let paginator = KeysetPaginator::new(Arc::clone(&store), context.visibility.clone());
        Self {
            store,
            paginator,
            context,
        }
    }

    pub fn context(&self) -> &GatewayContext {
        &self.context
    }

    fn scope(&self) -> PostScope {
        PostScope::now(self.context.visibility.clone())
    }

    /// Visible article with this slug.
    #[instrument(skip(self))]
    pub async fn article_by_slug(&self, slug: &str) -> GatewayResult<Option<Article>> {
        let post = self.store.find_post_by_slug(slug, &self.scope()).await?;
        Ok(post.map(|post| self.to_article(post)))
    }

    /// Visible articles for `raw_ids`, in the order given. Ids without a
    /// visible article are dropped.
    #[instrument(skip(self, raw_ids), fields(requested = raw_ids.len()))]
    pub async fn articles_by_ids(&self, raw_ids: &[u64]) -> GatewayResult<Vec<Article>> {
        if raw_ids.is_empty() {
            return Ok(Vec::new());
        }
        let posts = self.store.find_posts_by_ids(raw_ids, &self.scope()).await?;
        let by_id: HashMap<u64, PostRecord> =
            posts.into_iter().map(|post| (post.id, post)).collect();

        let articles: Vec<Article> = raw_ids
            .iter()
            .filter_map(|id| by_id.get(id).cloned())
            .map(|post| self.to_article(post))
            .collect();

        if articles.len() < raw_ids.len() {
            debug!(
                requested = raw_ids.len(),
                resolved = articles.len(),
                "dropped ids without a visible article"
            );
        }
        Ok(articles)
    }

    /// The canonical author of `article`.
    #[instrument(skip(self, article), fields(article_id = %article.id))]
    pub async fn article_author(&self, article: &Article) -> GatewayResult<Author> {
        let raw_id = self.decode(IdNamespace::Author, &article.author_id)?;
        let record = self
            .store
            .find_author_by_id(raw_id)
            .await?
            .ok_or_else(|| GatewayError::NotFound(format!("author {}", article.author_id)))?;
        self.to_author(record).await
    }

    /// Featured image of `article`, if it has one.
    #[instrument(skip(self, article), fields(article_id = %article.id))]
    pub async fn featured_image(&self, article: &Article) -> GatewayResult<Option<Image>> {
        let post_id = self.decode(IdNamespace::Article, &article.id)?;

        let Some(thumbnail) = self.store.post_meta(post_id, THUMBNAIL_META_KEY).await? else {
            return Ok(None);
        };
        let Some(attachment_id) = thumbnail
            .value
            .as_deref()
            .and_then(|value| value.trim().parse::<u64>().ok())
        else {
            warn!(post_id, value = ?thumbnail.value, "unusable thumbnail reference");
            return Ok(None);
        };

        let Some(attachment) = self.store.find_attachment(attachment_id).await? else {
            warn!(post_id, attachment_id, "thumbnail points at a missing attachment");
            return Ok(None);
        };
        let alt = self
            .store
            .post_meta(attachment_id, ATTACHMENT_ALT_META_KEY)
            .await?;

        Ok(Some(Image {
            url: rewrite_media_url(&attachment.url, &self.context.media_host)?,
            mime_type: text_or_none(Some(&attachment.mime_type)),
            caption: text_or_none(Some(&attachment.caption)),
            alt: text_or_none(alt.as_ref().and_then(|entry| entry.value.as_deref())),
        }))
    }

    /// One page of articles tagged with any of `taxonomy_ids`.
    #[instrument(skip(self, taxonomy_ids), fields(taxonomies = taxonomy_ids.len()))]
    pub async fn articles_page(
        &self,
        taxonomy_ids: &BTreeSet<u64>,
        take: Option<usize>,
        cursor: Option<&str>,
    ) -> GatewayResult<ArticlesEdge> {
        let page_size = self.context.resolve_page_size(take);
        let page = self
            .paginator
            .request_page(taxonomy_ids, page_size, cursor)
            .await?;
        let nodes = self.articles_by_ids(&page.ids).await?;

        Ok(ArticlesEdge {
            has_next_page: page.has_next_page,
            last_cursor: page.next_cursor,
            nodes,
        })
    }

    /// One page of a configured category's articles.
    #[instrument(skip(self))]
    pub async fn category_articles(
        &self,
        slug: &str,
        take: Option<usize>,
        cursor: Option<&str>,
    ) -> GatewayResult<ArticlesEdge> {
        let category = self
            .context
            .categories
            .get(slug)
            .ok_or_else(|| GatewayError::NotFound(format!("category {slug}")))?;
        self.articles_page(&category.taxonomy_ids, take, cursor)
            .await
    }

    #[instrument(skip(self))]
    pub async fn author_by_slug(&self, slug: &str) -> GatewayResult<Option<Author>> {
        match self.store.find_author_by_slug(slug).await? {
            Some(record) => Ok(Some(self.to_author(record).await?)),
            None => Ok(None),
        }
    }

    /// Author behind a public id, folded onto the canonical account.
    #[instrument(skip(self))]
    pub async fn author_by_public_id(&self, id: &str) -> GatewayResult<Option<Author>> {
        let raw_id = self.decode(IdNamespace::Author, id)?;
        let canonical_id = self.context.merges.canonicalize(raw_id);
        match self.store.find_author_by_id(canonical_id).await? {
            Some(record) => Ok(Some(self.to_author(record).await?)),
            None => Ok(None),
        }
    }

    /// Every visible article written under `author` or a merged sibling
    /// account, newest first.
    #[instrument(skip(self, author), fields(author_id = %author.id))]
    pub async fn author_articles(&self, author: &Author) -> GatewayResult<Vec<Article>> {
        let raw_id = self.decode(IdNamespace::Author, &author.id)?;
        let related = self.context.merges.related_ids(raw_id);
        let posts = self
            .store
            .find_posts_by_authors(&related.all_ids(), &self.scope())
            .await?;
        Ok(posts.into_iter().map(|post| self.to_article(post)).collect())
    }

    /// The account `author` was merged into, or `None` when `author` is
    /// already canonical.
    #[instrument(skip(self, author), fields(author_id = %author.id))]
    pub async fn canonical_author(&self, author: &Author) -> GatewayResult<Option<Author>> {
        let raw_id = self.decode(IdNamespace::Author, &author.id)?;
        let canonical_id = self.context.merges.related_ids(raw_id).canonical_id;
        if canonical_id == raw_id {
            return Ok(None);
        }

        let record = self
            .store
            .find_author_by_id(canonical_id)
            .await?
            .ok_or_else(|| {
                GatewayError::NotFound(format!("canonical author of {}", author.id))
            })?;
        Ok(Some(self.to_author(record).await?))
    }

    fn decode(&self, namespace: IdNamespace, id: &str) -> GatewayResult<u64> {
        Ok(self.context.ids.decode(namespace, id)?)
    }

    fn to_article(&self, post: PostRecord) -> Article {
        let ids = &self.context.ids;
        let author_id = self.context.merges.canonicalize(post.author_id);
        Article {
            id: ids.encode(IdNamespace::Article, post.id),
            slug: post.slug,
            title: post.title,
            content: post.content.trim().to_string(),
            published: post.published_at,
            updated: post.modified_at,
            author_id: ids.encode(IdNamespace::Author, author_id),
        }
    }

    async fn to_author(&self, record: AuthorRecord) -> GatewayResult<Author> {
        let bio = match self.store.user_meta(record.id, AUTHOR_BIO_META_KEY).await? {
            Some(entry) => text_or_none(entry.value.as_deref()),
            None => {
                warn!(user_id = record.id, "author has no bio meta row");
                None
            }
        };
        Ok(Author {
            id: self.context.ids.encode(IdNamespace::Author, record.id),
            slug: record.slug,
            name: record.display_name,
            bio,
        })
    }
}
