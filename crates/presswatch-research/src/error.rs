// Error types for research engines

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while a research run executes
#[derive(Debug, Error)]
pub enum EngineError {
    /// The query was empty or otherwise unusable
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A downstream search or analysis call failed
    #[error("Search failed: {0}")]
    Search(String),

    /// The engine finished without producing a report
    #[error("No report produced")]
    NoReport,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl EngineError {
    /// Create a search error
    pub fn search(msg: impl Into<String>) -> Self {
        EngineError::Search(msg.into())
    }

    /// Create an invalid-query error
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        EngineError::InvalidQuery(msg.into())
    }
}
