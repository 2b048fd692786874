//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    #[error("invalid seed: {0}")]
    InvalidSeed(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
