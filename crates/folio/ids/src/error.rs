use thiserror::Error;

/// Result type for identifier operations.
pub type IdResult<T> = Result<T, IdError>;

/// Identifier codec errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The string was not produced by the namespace's encoder.
    #[error("invalid {namespace} identifier '{value}'")]
    InvalidIdentifier { namespace: String, value: String },

    /// Codec settings rejected at load time.
    #[error("identifier configuration error: {0}")]
    Configuration(String),
}

impl IdError {
    pub fn invalid(namespace: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            namespace: namespace.into(),
            value: value.into(),
        }
    }
}
