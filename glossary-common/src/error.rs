//! Common error types for the glossary backend

use thiserror::Error;

/// Common result type for glossary operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across glossary services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or precondition violation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Request conflicts with existing state (duplicate entry, lost race)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Caller is not permitted to perform the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
