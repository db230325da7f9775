use thiserror::Error;

/// Result type for page requests.
pub type PageResult<T> = Result<T, PageError>;

/// Per-request pagination errors.
#[derive(Debug, Error)]
pub enum PageError {
    /// The cursor token does not parse into a membership key.
    #[error("invalid cursor '{cursor}': {reason}")]
    InvalidCursor { cursor: String, reason: String },

    #[error("invalid page size {0}: must be at least 1")]
    InvalidPageSize(usize),

    /// The membership source failed to answer the query.
    #[error("membership source error: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PageError {
    pub fn invalid_cursor(cursor: &str, reason: impl Into<String>) -> Self {
        Self::InvalidCursor {
            cursor: cursor.to_string(),
            reason: reason.into(),
        }
    }

    pub fn source(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Source(Box::new(err))
    }
}
