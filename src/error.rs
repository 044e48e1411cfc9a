//! ReplPad error types

use thiserror::Error;

use crate::util::config::ConfigError;

/// Errors surfaced to the user as in-document error fragments.
///
/// Broken document structure is not represented here: it panics in
/// [`crate::document`] instead of travelling through this type.
#[derive(Debug, Error)]
pub enum ReplError {
    /// A `%name` directive named a language that is not registered
    #[error("Unknown language requested: {0}")]
    UnknownLanguage(String),

    /// Guest code failed (syntax error, runtime exception, ...)
    #[error("{0}")]
    GuestExecution(String),

    /// The inspection hook produced something that cannot be placed inline
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("{0}")]
    Config(#[from] ConfigError),
}

impl ReplError {
    /// Build a guest execution error from any message
    pub fn guest(message: impl Into<String>) -> Self {
        ReplError::GuestExecution(message.into())
    }
}

impl From<serde_json::Error> for ReplError {
    fn from(e: serde_json::Error) -> Self {
        ReplError::Io(e.into())
    }
}

/// Result type for REPL operations
pub type ReplResult<T> = Result<T, ReplError>;
