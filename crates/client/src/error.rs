//! Client error types.

use shadow_core::onboarding::StorageError;
use shadow_core::profile::ProfileError;
use thiserror::Error;

/// Result type alias for client module.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
