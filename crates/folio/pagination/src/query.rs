use crate::{MembershipKey, PageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Visibility predicate on the content object a membership row points to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    /// Required publish status, e.g. `publish`.
    pub status: String,
    /// Required content type, e.g. `post`.
    pub content_type: String,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            status: "publish".to_string(),
            content_type: "post".to_string(),
        }
    }
}

impl Visibility {
    /// Whether an object with these attributes is visible at `now`.
    pub fn admits(
        &self,
        status: &str,
        content_type: &str,
        effective_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        status == self.status && content_type == self.content_type && effective_at <= now
    }
}

/// One page query against the membership relation.
///
/// A source answering it must return rows that
/// - have `term_taxonomy_id` in `taxonomy_ids`,
/// - point to an object admitted by `visibility` at `visible_at`,
/// - come strictly after `after` in [`MembershipKey`] order when it is set,
/// - are ordered by [`MembershipKey`], keep only the first row per object,
///   and number at most `limit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipQuery {
    pub taxonomy_ids: BTreeSet<u64>,
    pub visibility: Visibility,
    pub visible_at: DateTime<Utc>,
    pub after: Option<MembershipKey>,
    pub limit: usize,
}

impl MembershipQuery {
    /// Continuation test for a candidate row.
    ///
    /// A delivered object was represented by its first row, so any further
    /// row of the cursor's object would repeat it: those rows are skipped
    /// along with everything at or before the cursor.
    pub fn continues_after_cursor(&self, key: &MembershipKey) -> bool {
        match &self.after {
            Some(cursor) => *key > *cursor && key.object_id != cursor.object_id,
            None => true,
        }
    }

    /// Reference evaluation over rows whose objects already passed the
    /// visibility check. In-memory sources answer queries with this.
    pub fn select(&self, visible_rows: impl IntoIterator<Item = MembershipKey>) -> Vec<MembershipKey> {
        let mut rows: Vec<MembershipKey> = visible_rows
            .into_iter()
            .filter(|key| self.taxonomy_ids.contains(&key.term_taxonomy_id))
            .collect();
        rows.sort();
        rows.dedup_by_key(|key| key.object_id);
        rows.into_iter()
            .filter(|key| self.continues_after_cursor(key))
            .take(self.limit)
            .collect()
    }
}

/// Query interface over the membership relation.
#[async_trait]
pub trait MembershipSource: Send + Sync {
    /// Answer `query`; see [`MembershipQuery`] for the row contract.
    async fn fetch_memberships(&self, query: &MembershipQuery) -> PageResult<Vec<MembershipKey>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn query(taxonomy_ids: &[u64], after: Option<MembershipKey>, limit: usize) -> MembershipQuery {
        MembershipQuery {
            taxonomy_ids: taxonomy_ids.iter().copied().collect(),
            visibility: Visibility::default(),
            visible_at: Utc::now(),
            after,
            limit,
        }
    }

    #[test]
    fn visibility_checks_every_field() {
        let now = Utc::now();
        let visibility = Visibility::default();
        assert!(visibility.admits("publish", "post", now, now));
        assert!(!visibility.admits("draft", "post", now, now));
        assert!(!visibility.admits("publish", "page", now, now));
        assert!(!visibility.admits("publish", "post", now + Duration::minutes(1), now));
    }

    #[test]
    fn select_keeps_first_row_per_object() {
        let rows = [
            MembershipKey::new(10, 7),
            MembershipKey::new(10, 5),
            MembershipKey::new(9, 7),
            MembershipKey::new(8, 99),
        ];
        let selected = query(&[5, 7], None, 10).select(rows);
        assert_eq!(
            selected,
            vec![MembershipKey::new(10, 5), MembershipKey::new(9, 7)]
        );
    }

    #[test]
    fn select_resumes_strictly_after_cursor() {
        let rows = [
            MembershipKey::new(10, 5),
            MembershipKey::new(10, 7),
            MembershipKey::new(9, 5),
            MembershipKey::new(8, 5),
        ];
        let selected = query(&[5, 7], Some(MembershipKey::new(10, 5)), 10).select(rows);
        assert_eq!(
            selected,
            vec![MembershipKey::new(9, 5), MembershipKey::new(8, 5)]
        );
    }

    #[test]
    fn select_with_vanished_cursor_key() {
        let rows = [MembershipKey::new(12, 5), MembershipKey::new(8, 5)];
        let selected = query(&[5], Some(MembershipKey::new(10, 5)), 10).select(rows);
        assert_eq!(selected, vec![MembershipKey::new(8, 5)]);
    }

    #[test]
    fn select_applies_limit_last() {
        let rows = (1..=10).map(|id| MembershipKey::new(id, 5));
        let selected = query(&[5], None, 3).select(rows);
        assert_eq!(
            selected.iter().map(|k| k.object_id).collect::<Vec<_>>(),
            vec![10, 9, 8]
        );
    }
}
