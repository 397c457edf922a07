use thiserror::Error;
use uuid::Uuid;

/// Errors from the external profile store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("profile not found: {0}")]
    NotFound(Uuid),

    #[error("profile store error: {0}")]
    Storage(String),
}

/// Result type for profile store operations.
pub type Result<T> = std::result::Result<T, ProfileError>;
