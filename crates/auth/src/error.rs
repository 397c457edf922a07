use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shadow_core::profile::ProfileError;
use thiserror::Error;

/// Auth errors for the shadow_auth crate.
///
/// This wraps the core `AuthError` and adds the failures that only exist in
/// the HTTP shell.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (provider, token, session)
    #[error(transparent)]
    Core(#[from] shadow_core::auth::AuthError),

    /// Error from the profile store
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid email address")]
    InvalidEmail,

    /// No profile exists for the email a recovery was requested for.
    #[error("No account exists with this email address.")]
    AccountNotFound,
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        use shadow_core::auth::AuthError as CoreError;

        let (status, message) = match &self {
            AuthError::Core(core_err) => match core_err {
                CoreError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
                CoreError::InvalidLink | CoreError::CodeExchange(_) => {
                    (StatusCode::BAD_REQUEST, core_err.user_message())
                }
                CoreError::Provider(_) => {
                    tracing::error!("Identity provider error: {}", self);
                    (
                        StatusCode::BAD_GATEWAY,
                        "Authentication provider error".to_string(),
                    )
                }
            },
            AuthError::Profile(ProfileError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AuthError::Profile(ProfileError::Storage(_)) => {
                tracing::error!("Profile store error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AuthError::Config(_) => {
                tracing::error!("Config error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".to_string(),
                )
            }
            AuthError::InvalidEmail => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::AccountNotFound => (StatusCode::NOT_FOUND, self.to_string()),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
