//! Client error definitions.

use thiserror::Error;

/// Errors surfaced by the CLI client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("user id '{0}' is already connected")]
    DuplicateUserId(String),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("server error: {0}")]
    ServerError(String),
}
