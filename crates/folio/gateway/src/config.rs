//! Configuration for the gateway

use crate::{GatewayError, GatewayResult};
use folio_identity::MergeGroup;
use folio_ids::{CodecSettings, IdNamespace, DEFAULT_MIN_LENGTH};
use folio_pagination::Visibility;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Content store configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Upstream editorial service
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Public id codecs
    #[serde(default)]
    pub ids: IdsConfig,

    /// Author identity merging
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Content visibility and listing limits
    #[serde(default)]
    pub content: ContentConfig,

    /// Category definitions
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the hosting service listens on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Content store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory store (for development/testing)
    #[default]
    Memory,

    /// MySQL store over the CMS tables
    Mysql {
        /// Connection URL
        url: String,

        /// Maximum connections in pool
        #[serde(default = "default_pool_size")]
        max_connections: u32,

        /// Connection timeout in seconds
        #[serde(default = "default_connection_timeout")]
        connect_timeout_secs: u64,
    },
}

/// Upstream editorial service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Service endpoint
    #[serde(default)]
    pub url: String,

    /// Bearer token
    #[serde(default)]
    pub token: String,
}

/// Per-namespace codec settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdsConfig {
    #[serde(default = "default_author_codec")]
    pub author: CodecSettings,

    #[serde(default = "default_article_codec")]
    pub article: CodecSettings,
}

impl Default for IdsConfig {
    fn default() -> Self {
        Self {
            author: default_author_codec(),
            article: default_article_codec(),
        }
    }
}

/// Author identity merging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// YAML merge table; empty disables file loading
    #[serde(default = "default_merge_file")]
    pub merge_file: String,

    /// Inline groups; when non-empty the merge file is not read
    #[serde(default)]
    pub groups: BTreeMap<String, MergeGroup>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            merge_file: default_merge_file(),
            groups: BTreeMap::new(),
        }
    }
}

/// Content visibility and listing limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default)]
    pub visibility: Visibility,

    /// Page size when a request does not ask for one
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Larger requested page sizes are clamped to this
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Public host that media URLs are rewritten onto
    #[serde(default = "default_media_host")]
    pub media_host: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            visibility: Visibility::default(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            media_host: default_media_host(),
        }
    }
}

/// One category definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub slug: String,
    pub name: String,

    /// Non-section categories aggregate content from other sections
    #[serde(default = "default_true")]
    pub is_section: bool,

    /// Taxonomy keys whose members are listed under this category
    #[serde(default)]
    pub taxonomy_ids: Vec<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_port() -> u16 {
    8076
}

fn default_pool_size() -> u32 {
    10
}

fn default_connection_timeout() -> u64 {
    5
}

fn default_author_codec() -> CodecSettings {
    CodecSettings::new(IdNamespace::Author.as_str(), DEFAULT_MIN_LENGTH)
}

fn default_article_codec() -> CodecSettings {
    CodecSettings::new(IdNamespace::Article.as_str(), DEFAULT_MIN_LENGTH)
}

fn default_merge_file() -> String {
    "merge.yml".to_string()
}

fn default_page_size() -> usize {
    20
}

fn default_max_page_size() -> usize {
    100
}

fn default_media_host() -> String {
    "https://cms.studentnewspaper.org".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl GatewayConfig {
    /// Load configuration: defaults, then the optional file, then
    /// `FOLIO_`-prefixed environment variables (`FOLIO_UPSTREAM__TOKEN`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&GatewayConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("FOLIO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Reject configurations the gateway cannot start with.
    pub fn validate(&self) -> GatewayResult<()> {
        if self.upstream.url.trim().is_empty() {
            return Err(GatewayError::Config("upstream.url is required".to_string()));
        }
        url::Url::parse(&self.upstream.url)
            .map_err(|e| GatewayError::Config(format!("upstream.url is not a URL: {e}")))?;
        if self.upstream.token.trim().is_empty() {
            return Err(GatewayError::Config("upstream.token is required".to_string()));
        }

        if let StorageConfig::Mysql { url, .. } = &self.storage {
            if url.trim().is_empty() {
                return Err(GatewayError::Config("storage.url is required".to_string()));
            }
        }

        let content = &self.content;
        if content.default_page_size == 0 {
            return Err(GatewayError::Config(
                "content.default_page_size must be at least 1".to_string(),
            ));
        }
        if content.max_page_size < content.default_page_size {
            return Err(GatewayError::Config(format!(
                "content.max_page_size ({}) is below content.default_page_size ({})",
                content.max_page_size, content.default_page_size
            )));
        }
        url::Url::parse(&content.media_host)
            .map_err(|e| GatewayError::Config(format!("content.media_host is not a URL: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.upstream.url = "https://editorial.example.org/graphql".to_string();
        config.upstream.token = "secret".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.server.port, 8076);
        assert!(matches!(config.storage, StorageConfig::Memory));
        assert_eq!(config.content.default_page_size, 20);
        assert_eq!(config.content.max_page_size, 100);
        assert_eq!(config.content.visibility, Visibility::default());
        assert_eq!(config.identity.merge_file, "merge.yml");
    }

    #[test]
    fn test_codec_defaults_use_namespace_salts() {
        let ids = IdsConfig::default();
        assert_eq!(ids.author.salt, "author");
        assert_eq!(ids.article.salt, "article");
        assert_eq!(ids.author.min_length, 10);
    }

    #[test]
    fn test_upstream_is_required() {
        let err = GatewayConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("upstream.url"));

        let mut config = valid();
        config.upstream.token = "  ".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("upstream.token"));

        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_page_size_bounds() {
        let mut config = valid();
        config.content.default_page_size = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.content.max_page_size = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(
            file,
            r#"
server:
  port: 9000
storage:
  type: mysql
  url: mysql://folio@localhost/wordpress
upstream:
  url: https://editorial.example.org/graphql
  token: abc
ids:
  author:
    salt: pepper
content:
  max_page_size: 50
categories:
  - slug: news
    name: News
    taxonomy_ids: [5, 7]
  - slug: featured
    name: Featured
    is_section: false
    taxonomy_ids: [9]
logging:
  json: true
"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = GatewayConfig::load(Some(&path)).unwrap();

        assert_eq!(config.server.port, 9000);
        match &config.storage {
            StorageConfig::Mysql {
                url,
                max_connections,
                connect_timeout_secs,
            } => {
                assert_eq!(url, "mysql://folio@localhost/wordpress");
                assert_eq!(*max_connections, 10);
                assert_eq!(*connect_timeout_secs, 5);
            }
            other => panic!("unexpected storage config: {other:?}"),
        }
        assert_eq!(config.ids.author.salt, "pepper");
        assert_eq!(config.ids.author.min_length, 10);
        assert_eq!(config.ids.article.salt, "article");
        assert_eq!(config.content.max_page_size, 50);
        assert_eq!(config.content.default_page_size, 20);
        assert_eq!(config.categories.len(), 2);
        assert!(config.categories[0].is_section);
        assert!(!config.categories[1].is_section);
        assert!(config.logging.json);
        assert!(config.validate().is_ok());
    }
}
