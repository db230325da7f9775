use crate::{MergeConfigError, MergeResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info};

/// One merge group as written in the merge file.
///
/// ```yaml
/// jane-doe:
///   to: 100
///   from: [101, 102]
///   include: [103]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeGroup {
    /// Canonical account id.
    pub to: u64,

    /// Aliases folded onto `to` everywhere an author id is exposed.
    #[serde(default)]
    pub from: Vec<u64>,

    /// Extra accounts whose content is listed under `to`, without aliasing.
    #[serde(default)]
    pub include: Vec<u64>,
}

/// Canonical id and the sibling raw ids that share its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedIds {
    pub canonical_id: u64,
    /// `(from ∪ include) \ {canonical_id}`.
    pub other_ids: BTreeSet<u64>,
}

impl RelatedIds {
    fn standalone(id: u64) -> Self {
        Self {
            canonical_id: id,
            other_ids: BTreeSet::new(),
        }
    }

    /// Canonical id followed by every sibling.
    pub fn all_ids(&self) -> Vec<u64> {
        std::iter::once(self.canonical_id)
            .chain(self.other_ids.iter().copied())
            .collect()
    }
}

/// Immutable, validated author merge table.
#[derive(Debug, Clone, Default)]
pub struct MergeTable {
    names: Vec<String>,
    groups: Vec<MergeGroup>,
    /// alias id -> group index
    aliases: HashMap<u64, usize>,
    /// canonical id -> group index
    canonical: HashMap<u64, usize>,
}

impl MergeTable {
    /// A table with no groups: every id is its own canonical id.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load and validate the merge file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> MergeResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| MergeConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_yaml_str(&raw)?;
        info!(
            path = %path.display(),
            groups = table.len(),
            "loaded author merge table"
        );
        Ok(table)
    }

    /// Parse and validate a YAML mapping of group name to [`MergeGroup`].
    pub fn from_yaml_str(raw: &str) -> MergeResult<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::empty());
        }
        let parsed: Option<serde_yaml::Mapping> =
            serde_yaml::from_str(raw).map_err(|e| MergeConfigError::Malformed(e.to_string()))?;

        let groups = parsed
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| {
                let name = match key {
                    serde_yaml::Value::String(name) => name,
                    other => {
                        return Err(MergeConfigError::Malformed(format!(
                            "group name must be a string, got {other:?}"
                        )))
                    }
                };
                let group: MergeGroup = serde_yaml::from_value(value)
                    .map_err(|e| MergeConfigError::Malformed(format!("group '{name}': {e}")))?;
                Ok((name, group))
            })
            .collect::<MergeResult<Vec<_>>>()?;
        Self::from_groups(groups)
    }

    /// Validate already-parsed groups.
    pub fn from_groups(
        groups: impl IntoIterator<Item = (String, MergeGroup)>,
    ) -> MergeResult<Self> {
        let mut table = Self::default();
        // member id -> group index, across `from` and `include`
        let mut members: HashMap<u64, usize> = HashMap::new();

        for (name, group) in groups {
            let index = table.groups.len();

            if let Some(&other) = table.canonical.get(&group.to) {
                return Err(MergeConfigError::DuplicateCanonical {
                    id: group.to,
                    first: table.names[other].clone(),
                    second: name,
                });
            }

            for &id in group.from.iter().chain(group.include.iter()) {
                if id == group.to {
                    continue;
                }
                match members.get(&id) {
                    Some(&other) if other != index => {
                        return Err(MergeConfigError::DuplicateMember {
                            id,
                            first: table.names[other].clone(),
                            second: name,
                        });
                    }
                    Some(_) => {}
                    None => {
                        members.insert(id, index);
                    }
                }
            }

            table.canonical.insert(group.to, index);
            for &id in &group.from {
                table.aliases.insert(id, index);
            }
            table.names.push(name);
            table.groups.push(group);
        }

        for (index, group) in table.groups.iter().enumerate() {
            if let Some(&other) = members.get(&group.to) {
                if other != index {
                    return Err(MergeConfigError::CanonicalIsMember {
                        id: group.to,
                        group: table.names[index].clone(),
                        member_of: table.names[other].clone(),
                    });
                }
            }
        }

        debug!(groups = table.groups.len(), "validated merge groups");
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Named groups in the order they were loaded. Merge files keep their
    /// written order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &MergeGroup)> {
        self.names.iter().map(String::as_str).zip(self.groups.iter())
    }

    /// Fold an alias onto its canonical id; any other id is returned as-is.
    pub fn canonicalize(&self, raw_id: u64) -> u64 {
        self.aliases
            .get(&raw_id)
            .map(|&index| self.groups[index].to)
            .unwrap_or(raw_id)
    }

    /// Canonical id and siblings for an alias or canonical id.
    ///
    /// Ids listed only under `include` are not resolved to their group: they
    /// are listed under the canonical author but keep their own identity.
    pub fn related_ids(&self, raw_id: u64) -> RelatedIds {
        let index = self
            .aliases
            .get(&raw_id)
            .or_else(|| self.canonical.get(&raw_id));

        let Some(&index) = index else {
            return RelatedIds::standalone(raw_id);
        };

        let group = &self.groups[index];
        let other_ids = group
            .from
            .iter()
            .chain(group.include.iter())
            .copied()
            .filter(|&id| id != group.to)
            .collect();

        RelatedIds {
            canonical_id: group.to,
            other_ids,
        }
    }

    /// True when `raw_id` is already the id the public API should expose.
    pub fn is_canonical(&self, raw_id: u64) -> bool {
        self.canonicalize(raw_id) == raw_id
    }
}
