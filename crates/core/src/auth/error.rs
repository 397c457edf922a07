use thiserror::Error;

/// Message shown when the provider rejects an exchange without saying why.
pub const GENERIC_AUTH_FAILURE: &str = "Authentication failed";

/// Message shown when a callback carries neither a code nor an error.
pub const INVALID_LINK_MESSAGE: &str = "Invalid authentication link";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The provider refused to redeem a one-time code. Carries the
    /// provider's own message, which is shown to the user.
    #[error("failed to exchange authorization code: {0}")]
    CodeExchange(String),

    /// The provider could not be reached or answered with an unexpected
    /// payload.
    #[error("provider error: {0}")]
    Provider(String),

    /// The access token was rejected and could not be refreshed.
    #[error("session is no longer valid")]
    Unauthorized,

    /// Callback reached with neither `code` nor `error`.
    #[error("invalid authentication link")]
    InvalidLink,
}

impl AuthError {
    /// Human-readable message for the error page.
    ///
    /// Provider messages are passed through as-is; everything else collapses
    /// to a generic text so internals never leak into a URL.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::CodeExchange(message) | AuthError::Provider(message)
                if !message.trim().is_empty() =>
            {
                message.clone()
            }
            AuthError::InvalidLink => INVALID_LINK_MESSAGE.to_string(),
            _ => GENERIC_AUTH_FAILURE.to_string(),
        }
    }
}
