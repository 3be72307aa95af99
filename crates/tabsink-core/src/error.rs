//! Error types for tabsink

use thiserror::Error;

/// Core error type for tabsink operations
#[derive(Error, Debug)]
pub enum TabsinkError {
    /// Unknown dialect or missing credentials; raised before any network call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Schema error: {0}")]
    Schema(String),

    /// A non-nullable, non-key column holds (or would hold) null values.
    /// Raised during reconciliation, before any insert is attempted.
    #[error("column `{column}` is non-nullable but has null values")]
    NullConstraint { column: String },

    #[error("Insert error: {0}")]
    Insert(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for tabsink operations
pub type Result<T> = std::result::Result<T, TabsinkError>;
