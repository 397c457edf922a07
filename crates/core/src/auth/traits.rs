use async_trait::async_trait;

use super::{AuthError, AuthUser, ExchangeCode, RefreshOutcome, Session, SessionTokens};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// The external identity provider, reduced to the calls this system makes.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Redeem a one-time code for a session. Codes are single-use: a second
    /// call with the same code must fail.
    async fn exchange_code(&self, code: &ExchangeCode) -> Result<Session>;

    /// Validate the tokens, rotating them if the access token has expired.
    async fn refresh_session(&self, tokens: &SessionTokens) -> Result<RefreshOutcome>;

    /// Look up the user owning an access token.
    async fn get_user(&self, access_token: &str) -> Result<AuthUser>;

    /// Send a password recovery email whose link returns to `redirect_to`.
    async fn send_recovery_email(&self, email: &str, redirect_to: &str) -> Result<()>;
}
