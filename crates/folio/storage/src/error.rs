use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-layer errors. Missing records are `Ok(None)`, never an error.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_is_the_only_failure() {
        let err = StorageError::Backend("posts lock poisoned".to_string());
        let StorageError::Backend(message) = &err;
        assert_eq!(message, "posts lock poisoned");
        assert_eq!(err.to_string(), "backend error: posts lock poisoned");
    }
}
