//! Error types for marcapagina-core

use thiserror::Error;

/// Main error type for the marcapagina-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// User-supplied value rejected before it reached storage
    #[error("invalid input: {0}")]
    Validation(String),

    /// Book status string outside the known set
    #[error("unknown book status: {0}")]
    InvalidStatus(String),

    /// Book not found
    #[error("book not found: {0}")]
    BookNotFound(String),

    /// Highlight not found
    #[error("highlight not found: {0}")]
    HighlightNotFound(String),

    /// A previous holder of the connection lock panicked
    #[error("database connection lock poisoned")]
    LockPoisoned,
}

/// Result type alias for marcapagina-core
pub type Result<T> = std::result::Result<T, Error>;
