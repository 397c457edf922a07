//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use axum_extra::extract::CookieJar;
use shadow_core::auth::{AuthUser, SessionTokens};

use crate::cookies;
use crate::session::RequestSession;
use crate::AuthState;

/// Resolve the request's session.
///
/// Prefers the session published by the refresher; routes outside the
/// refresher fall back to validating the cookies directly.
async fn resolve(parts: &Parts, auth_state: &AuthState) -> RequestSession {
    if let Some(session) = parts.extensions.get::<RequestSession>() {
        return session.clone();
    }

    let jar = CookieJar::from_headers(&parts.headers);
    let Some(tokens) = cookies::read_tokens(&jar, &auth_state.config) else {
        return RequestSession::Anonymous;
    };

    match auth_state.provider.get_user(&tokens.access_token).await {
        Ok(user) => RequestSession::Authenticated { user, tokens },
        Err(err) => {
            tracing::debug!(error = %err, "Cookie session rejected");
            RequestSession::Anonymous
        }
    }
}

/// Extractor for authenticated user. Returns 401 if not authenticated.
pub struct CurrentSession {
    pub user: AuthUser,
    pub tokens: SessionTokens,
}

impl<S> FromRequestParts<S> for CurrentSession
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        match resolve(parts, &auth_state).await {
            RequestSession::Authenticated { user, tokens } => Ok(CurrentSession { user, tokens }),
            RequestSession::Anonymous => Err((StatusCode::UNAUTHORIZED, "Not signed in")),
        }
    }
}

/// Extractor for optionally authenticated user. Never rejects.
pub struct OptionalSession(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for OptionalSession
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let session = resolve(parts, &auth_state).await;
        Ok(OptionalSession(session.user().cloned()))
    }
}
