use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Composite key of one category membership row.
///
/// `Ord` is listing order: `object_id` descending, then `term_taxonomy_id`
/// ascending. "Strictly after" a cursor means `key > cursor` under this
/// ordering, which is lexicographic on the pair with the first component
/// reversed, not two independent field comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MembershipKey {
    pub object_id: u64,
    pub term_taxonomy_id: u64,
}

impl MembershipKey {
    pub fn new(object_id: u64, term_taxonomy_id: u64) -> Self {
        Self {
            object_id,
            term_taxonomy_id,
        }
    }
}

impl Ord for MembershipKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .object_id
            .cmp(&self.object_id)
            .then_with(|| self.term_taxonomy_id.cmp(&other.term_taxonomy_id))
    }
}

impl PartialOrd for MembershipKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MembershipKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.object_id, self.term_taxonomy_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_object_ids_come_first() {
        assert!(MembershipKey::new(50, 9) < MembershipKey::new(49, 1));
    }

    #[test]
    fn taxonomy_breaks_ties_ascending() {
        assert!(MembershipKey::new(50, 1) < MembershipKey::new(50, 2));
    }

    #[test]
    fn mixed_direction_is_not_fieldwise() {
        // Both fields of the later key are "smaller" numerically, yet it
        // still sorts after: object id dominates.
        let cursor = MembershipKey::new(50, 7);
        let later = MembershipKey::new(49, 3);
        assert!(later > cursor);
        assert!(later.term_taxonomy_id < cursor.term_taxonomy_id);
    }

    #[test]
    fn sorting_gives_listing_order() {
        let mut keys = vec![
            MembershipKey::new(3, 2),
            MembershipKey::new(5, 9),
            MembershipKey::new(3, 1),
            MembershipKey::new(5, 4),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                MembershipKey::new(5, 4),
                MembershipKey::new(5, 9),
                MembershipKey::new(3, 1),
                MembershipKey::new(3, 2),
            ]
        );
    }
}
