//! Load-once shared state.
//!
//! Everything here is built from [`GatewayConfig`] at startup, validated
//! eagerly, and then only read. Handlers share it through an `Arc`.

use crate::config::{CategoryConfig, GatewayConfig};
use crate::{GatewayError, GatewayResult};
use folio_identity::MergeTable;
use folio_ids::IdCodecs;
use folio_pagination::Visibility;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::info;

/// A configured category and the taxonomy keys it lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
    pub is_section: bool,
    pub taxonomy_ids: BTreeSet<u64>,
}

/// Configured categories, addressable by slug.
#[derive(Debug, Clone, Default)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
    by_slug: HashMap<String, usize>,
}

impl CategoryCatalog {
    pub fn from_configs(configs: &[CategoryConfig]) -> GatewayResult<Self> {
        let mut catalog = Self::default();
        for config in configs {
            let slug = config.slug.trim();
            if slug.is_empty() {
                return Err(GatewayError::Config(format!(
                    "category '{}' has an empty slug",
                    config.name
                )));
            }
            if catalog.by_slug.contains_key(slug) {
                return Err(GatewayError::Config(format!(
                    "category slug '{slug}' is defined twice"
                )));
            }
            catalog
                .by_slug
                .insert(slug.to_string(), catalog.categories.len());
            catalog.categories.push(Category {
                slug: slug.to_string(),
                name: config.name.clone(),
                is_section: config.is_section,
                taxonomy_ids: config.taxonomy_ids.iter().copied().collect(),
            });
        }
        Ok(catalog)
    }

    pub fn get(&self, slug: &str) -> Option<&Category> {
        self.by_slug.get(slug).map(|&index| &self.categories[index])
    }

    /// Categories in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn sections(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|c| c.is_section)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Read-only state shared by every request.
#[derive(Debug, Clone)]
pub struct GatewayContext {
    pub ids: IdCodecs,
    pub merges: MergeTable,
    pub categories: CategoryCatalog,
    pub visibility: Visibility,
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub media_host: String,
}

impl GatewayContext {
    /// Validate `config` and build the shared state. Any error here is a
    /// startup failure.
    pub fn from_config(config: &GatewayConfig) -> GatewayResult<Self> {
        config.validate()?;

        let ids = IdCodecs::new(&config.ids.author, &config.ids.article)?;

        let identity = &config.identity;
        let merges = if !identity.groups.is_empty() {
            MergeTable::from_groups(identity.groups.clone())?
        } else if !identity.merge_file.trim().is_empty() {
            MergeTable::from_path(&identity.merge_file)?
        } else {
            MergeTable::empty()
        };

        let categories = CategoryCatalog::from_configs(&config.categories)?;

        info!(
            merge_groups = merges.len(),
            categories = categories.len(),
            "gateway context ready"
        );

        Ok(Self {
            ids,
            merges,
            categories,
            visibility: config.content.visibility.clone(),
            default_page_size: config.content.default_page_size,
            max_page_size: config.content.max_page_size,
            media_host: config.content.media_host.clone(),
        })
    }

    /// Page size to serve for a requested `take`.
    ///
    /// `None` means the default; oversized requests are clamped. Zero is
    /// passed through so the paginator rejects it.
    pub fn resolve_page_size(&self, take: Option<usize>) -> usize {
        take.unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }
}
