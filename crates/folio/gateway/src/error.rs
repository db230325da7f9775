//! Error types for the gateway

use folio_identity::MergeConfigError;
use folio_ids::IdError;
use folio_pagination::PageError;
use folio_storage::StorageError;
use thiserror::Error;

/// Gateway-level errors
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Public id codec failure (bad id or bad codec settings)
    #[error(transparent)]
    Id(#[from] IdError),

    /// Author merge table failed to load
    #[error(transparent)]
    Merge(#[from] MergeConfigError),

    /// Pagination request failure
    #[error(transparent)]
    Page(#[from] PageError),

    /// Content store failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A referenced record has no backing row
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request input that is neither an id nor a cursor, e.g. a link
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<config::ConfigError> for GatewayError {
    fn from(err: config::ConfigError) -> Self {
        GatewayError::Config(err.to_string())
    }
}

impl GatewayError {
    /// Load-time failures that must abort startup.
    pub fn is_configuration(&self) -> bool {
        match self {
            GatewayError::Config(_) | GatewayError::Merge(_) => true,
            GatewayError::Id(err) => matches!(err, IdError::Configuration(_)),
            _ => false,
        }
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
