//! CLI error types.

use feedcal_gdata::FeedError;
use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A secret reference could not be resolved.
    #[error("secret error: {0}")]
    Secret(String),

    /// Neither a password nor a token is configured.
    #[error("authentication required: {0}")]
    AuthRequired(String),

    /// Bad command-line value.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Nothing matched the given name or id.
    #[error("not found: {0}")]
    NotFound(String),

    /// Error reported by the calendar service or client.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
