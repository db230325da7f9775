//! MySQL adapter over the WordPress schema.
//!
//! Read-only: the CMS owns the tables and their DDL, so this adapter never
//! creates or migrates anything. Timestamps are read from the `*_gmt`
//! columns and treated as UTC.

use crate::model::{AttachmentRecord, AuthorRecord, MetaEntry, PostRecord};
use crate::traits::{ArticleStore, AuthorStore, MediaStore, PostScope};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use folio_pagination::{MembershipKey, MembershipQuery, MembershipSource, PageError, PageResult};
use sqlx::mysql::{MySql, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{QueryBuilder, Row};
use tracing::debug;

const POST_COLUMNS: &str = "p.ID, p.post_name, p.post_title, p.post_content, p.post_author, \
     p.post_status, p.post_type, p.post_date_gmt, p.post_modified_gmt";

/// MySQL-backed content store.
#[derive(Clone)]
pub struct MySqlContentStore {
    pool: MySqlPool,
}

impl MySqlContentStore {
    /// Connect with default pool parameters.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        Self::connect_with_options(database_url, 10, 5).await
    }

    /// Connect with explicit pool parameters.
    pub async fn connect_with_options(
        database_url: &str,
        max_connections: u32,
        connect_timeout_secs: u64,
    ) -> StorageResult<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(connect_timeout_secs))
            .connect(database_url)
            .await
            .map_err(|e| StorageError::Backend(format!("failed to connect mysql: {e}")))?;
        debug!(max_connections, "mysql pool ready");
        Ok(Self { pool })
    }

    /// Create adapter from an existing pool.
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    async fn fetch_posts(
        &self,
        mut query: QueryBuilder<'_, MySql>,
        scope: &PostScope,
    ) -> StorageResult<Vec<PostRecord>> {
        push_visibility(&mut query, scope);
        query.push(" ORDER BY p.post_date_gmt DESC, p.ID DESC");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        rows.iter().map(row_to_post).collect()
    }

    async fn meta_value(
        &self,
        table: &str,
        owner_column: &str,
        owner_id: u64,
        key: &str,
    ) -> StorageResult<Option<MetaEntry>> {
        let mut query = QueryBuilder::<MySql>::new("SELECT meta_value FROM ");
        query
            .push(table)
            .push(" WHERE ")
            .push(owner_column)
            .push(" = ")
            .push_bind(owner_id)
            .push(" AND meta_key = ")
            .push_bind(key)
            .push(" ORDER BY meta_id ASC LIMIT 1");

        let row = query
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        row.map(|r| {
            r.try_get::<Option<String>, _>("meta_value")
                .map(|value| MetaEntry { value })
                .map_err(|e| StorageError::Backend(e.to_string()))
        })
        .transpose()
    }
}

fn push_visibility(query: &mut QueryBuilder<'_, MySql>, scope: &PostScope) {
    query
        .push(" AND p.post_status = ")
        .push_bind(scope.visibility.status.clone())
        .push(" AND p.post_type = ")
        .push_bind(scope.visibility.content_type.clone())
        .push(" AND p.post_date_gmt <= ")
        .push_bind(scope.at.naive_utc());
}

fn push_id_list(query: &mut QueryBuilder<'_, MySql>, ids: &[u64]) {
    query.push(" (");
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

fn row_to_post(row: &MySqlRow) -> StorageResult<PostRecord> {
    let get_err = |e: sqlx::Error| StorageError::Backend(e.to_string());
    Ok(PostRecord {
        id: row.try_get("ID").map_err(get_err)?,
        slug: row.try_get("post_name").map_err(get_err)?,
        title: row.try_get("post_title").map_err(get_err)?,
        content: row.try_get("post_content").map_err(get_err)?,
        author_id: row.try_get("post_author").map_err(get_err)?,
        status: row.try_get("post_status").map_err(get_err)?,
        post_type: row.try_get("post_type").map_err(get_err)?,
        published_at: row
            .try_get::<NaiveDateTime, _>("post_date_gmt")
            .map_err(get_err)?
            .and_utc(),
        modified_at: row
            .try_get::<NaiveDateTime, _>("post_modified_gmt")
            .map_err(get_err)?
            .and_utc(),
    })
}

fn row_to_author(row: &MySqlRow) -> StorageResult<AuthorRecord> {
    let get_err = |e: sqlx::Error| StorageError::Backend(e.to_string());
    Ok(AuthorRecord {
        id: row.try_get("ID").map_err(get_err)?,
        slug: row.try_get("user_nicename").map_err(get_err)?,
        display_name: row.try_get("display_name").map_err(get_err)?,
    })
}

#[async_trait]
impl MembershipSource for MySqlContentStore {
    async fn fetch_memberships(&self, query: &MembershipQuery) -> PageResult<Vec<MembershipKey>> {
        if query.taxonomy_ids.is_empty() || query.limit == 0 {
            return Ok(Vec::new());
        }

        // First row per object in key order is its smallest taxonomy id, and
        // every row after the cursor that is not the cursor's object has a
        // smaller object id.
        let mut sql = QueryBuilder::<MySql>::new(
            "SELECT tr.object_id, MIN(tr.term_taxonomy_id) AS term_taxonomy_id \
             FROM wp_term_relationships tr \
             INNER JOIN wp_posts p ON p.ID = tr.object_id \
             WHERE tr.term_taxonomy_id IN",
        );
        let ids: Vec<u64> = query.taxonomy_ids.iter().copied().collect();
        push_id_list(&mut sql, &ids);
        push_visibility(
            &mut sql,
            &PostScope::new(query.visibility.clone(), query.visible_at),
        );
        if let Some(after) = &query.after {
            sql.push(" AND tr.object_id < ").push_bind(after.object_id);
        }
        sql.push(" GROUP BY tr.object_id ORDER BY tr.object_id DESC LIMIT ")
            .push_bind(query.limit as u64);

        let rows = sql
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PageError::source(StorageError::Backend(e.to_string())))?;

        rows.iter()
            .map(|row| {
                let object_id: u64 = row.try_get("object_id")?;
                let term_taxonomy_id: u64 = row.try_get("term_taxonomy_id")?;
                Ok(MembershipKey::new(object_id, term_taxonomy_id))
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(|e| PageError::source(StorageError::Backend(e.to_string())))
    }
}

#[async_trait]
impl ArticleStore for MySqlContentStore {
    async fn find_post_by_slug(
        &self,
        slug: &str,
        scope: &PostScope,
    ) -> StorageResult<Option<PostRecord>> {
        let mut query = QueryBuilder::<MySql>::new("SELECT ");
        query
            .push(POST_COLUMNS)
            .push(" FROM wp_posts p WHERE p.post_name = ")
            .push_bind(slug.to_string());
        Ok(self.fetch_posts(query, scope).await?.into_iter().next())
    }

    async fn find_posts_by_ids(
        &self,
        ids: &[u64],
        scope: &PostScope,
    ) -> StorageResult<Vec<PostRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query = QueryBuilder::<MySql>::new("SELECT ");
        query.push(POST_COLUMNS).push(" FROM wp_posts p WHERE p.ID IN");
        push_id_list(&mut query, ids);
        self.fetch_posts(query, scope).await
    }

    async fn find_posts_by_authors(
        &self,
        author_ids: &[u64],
        scope: &PostScope,
    ) -> StorageResult<Vec<PostRecord>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query = QueryBuilder::<MySql>::new("SELECT ");
        query
            .push(POST_COLUMNS)
            .push(" FROM wp_posts p WHERE p.post_author IN");
        push_id_list(&mut query, author_ids);
        self.fetch_posts(query, scope).await
    }
}

#[async_trait]
impl AuthorStore for MySqlContentStore {
    async fn find_author_by_id(&self, id: u64) -> StorageResult<Option<AuthorRecord>> {
        let row = sqlx::query(
            "SELECT ID, user_nicename, display_name FROM wp_users WHERE ID = ? LIMIT 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?;
        row.as_ref().map(row_to_author).transpose()
    }

    async fn find_author_by_slug(&self, slug: &str) -> StorageResult<Option<AuthorRecord>> {
        let row = sqlx::query(
            "SELECT ID, user_nicename, display_name FROM wp_users \
             WHERE user_nicename = ? ORDER BY ID ASC LIMIT 1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?;
        row.as_ref().map(row_to_author).transpose()
    }

    async fn user_meta(&self, user_id: u64, key: &str) -> StorageResult<Option<MetaEntry>> {
        self.meta_value("wp_usermeta", "user_id", user_id, key)
            .await
    }
}

#[async_trait]
impl MediaStore for MySqlContentStore {
    async fn post_meta(&self, post_id: u64, key: &str) -> StorageResult<Option<MetaEntry>> {
        self.meta_value("wp_postmeta", "post_id", post_id, key)
            .await
    }

    async fn find_attachment(&self, id: u64) -> StorageResult<Option<AttachmentRecord>> {
        let row = sqlx::query(
            "SELECT ID, guid, post_mime_type, post_excerpt FROM wp_posts \
             WHERE ID = ? AND post_type = 'attachment' LIMIT 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let get_err = |e: sqlx::Error| StorageError::Backend(e.to_string());
        Ok(Some(AttachmentRecord {
            id: row.try_get("ID").map_err(get_err)?,
            url: row.try_get("guid").map_err(get_err)?,
            mime_type: row.try_get("post_mime_type").map_err(get_err)?,
            caption: row.try_get("post_excerpt").map_err(get_err)?,
        }))
    }
}
