//! Error types for session and token-store operations

/// Errors from session and token-store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("token store io: {0}")]
    Io(String),

    #[error("token store parse: {0}")]
    Parse(String),

    #[error("token store lock poisoned")]
    Poisoned,
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;
