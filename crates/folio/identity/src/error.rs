use thiserror::Error;

/// Result type for merge table loading.
pub type MergeResult<T> = Result<T, MergeConfigError>;

/// Load-time merge table errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum MergeConfigError {
    #[error("failed to read merge table {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed merge table: {0}")]
    Malformed(String),

    #[error("author {id} is a member of both '{first}' and '{second}'")]
    DuplicateMember {
        id: u64,
        first: String,
        second: String,
    },

    #[error("author {id} is canonical for '{group}' but also a member of '{member_of}'")]
    CanonicalIsMember {
        id: u64,
        group: String,
        member_of: String,
    },

    #[error("author {id} is canonical for both '{first}' and '{second}'")]
    DuplicateCanonical {
        id: u64,
        first: String,
        second: String,
    },
}
