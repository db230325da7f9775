use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A content object row (`wp_posts`) with the fields the gateway reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: u64,
    pub slug: String,
    pub title: String,
    pub content: String,
    /// Raw author account id, before identity merging.
    pub author_id: u64,
    pub status: String,
    pub post_type: String,
    /// Effective visibility instant (`post_date_gmt`).
    pub published_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// An author account row (`wp_users`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRecord {
    pub id: u64,
    /// URL slug (`user_nicename`).
    pub slug: String,
    pub display_name: String,
}

/// A media attachment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    pub id: u64,
    /// Original upload URL (`guid`).
    pub url: String,
    pub mime_type: String,
    /// Caption (`post_excerpt`).
    pub caption: String,
}

/// A meta row that exists; its value column may still be NULL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaEntry {
    pub value: Option<String>,
}

impl MetaEntry {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }
}
