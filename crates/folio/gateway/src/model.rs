use chrono::{DateTime, Utc};
use serde::Serialize;

/// Public article. Ids are opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub published: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    /// Public id of the canonical author.
    pub author_id: String,
}

/// Public author profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub bio: Option<String>,
}

/// A featured image, served from the public media host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub url: String,
    pub mime_type: Option<String>,
    pub caption: Option<String>,
    pub alt: Option<String>,
}

/// One page of articles plus the token to continue from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlesEdge {
    pub has_next_page: bool,
    pub last_cursor: Option<String>,
    pub nodes: Vec<Article>,
}

/// Trimmed text, or `None` when nothing is left.
pub(crate) fn text_or_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_none() {
        assert_eq!(text_or_none(None), None);
        assert_eq!(text_or_none(Some("   \n")), None);
        assert_eq!(text_or_none(Some("  Staff writer. ")), Some("Staff writer.".to_string()));
    }

    #[test]
    fn edge_serializes_camel_case() {
        let edge = ArticlesEdge {
            has_next_page: false,
            last_cursor: None,
            nodes: vec![],
        };
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["hasNextPage"], false);
        assert!(json["lastCursor"].is_null());
    }
}
