//! Edge session refresher.
//!
//! Runs ahead of every non-static request: validates the session cookies
//! with the identity provider, rewrites them when the provider rotated the
//! tokens, and publishes the result as a [`RequestSession`] extension.
//! Provider failures never block a request.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use shadow_core::auth::{
    classify_route, is_excluded_path, route_decision, RefreshOutcome, RouteDecision, SessionTokens,
    SIGN_IN_PATH,
};

use crate::cookies;
use crate::session::RequestSession;
use crate::AuthState;

/// Middleware entry point. Mount with
/// `axum::middleware::from_fn_with_state(state, refresh_session)`.
pub async fn refresh_session(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    if is_excluded_path(&path) {
        return next.run(req).await;
    }

    let jar = CookieJar::from_headers(req.headers());
    let (session, rotated) = match cookies::read_tokens(&jar, &state.config) {
        Some(tokens) => validate(&state, tokens, &path).await,
        None => (RequestSession::Anonymous, None),
    };

    let class = classify_route(&path);
    tracing::debug!(
        path = %path,
        class = ?class,
        authenticated = session.is_authenticated(),
        "Classified route"
    );

    if route_decision(
        state.config.route_enforcement,
        class,
        session.is_authenticated(),
    ) == RouteDecision::RedirectToSignIn
    {
        return Redirect::to(SIGN_IN_PATH).into_response();
    }

    req.extensions_mut().insert(session);
    let response = next.run(req).await;

    match rotated {
        // A handler that set its own session (e.g. a fresh login) wins.
        Some(tokens) if !cookies::response_sets_session(response.headers(), &state.config) => {
            let jar = cookies::write_tokens(CookieJar::new(), &state.config, &tokens);
            (jar, response).into_response()
        }
        _ => response,
    }
}

async fn validate(
    state: &AuthState,
    tokens: SessionTokens,
    path: &str,
) -> (RequestSession, Option<SessionTokens>) {
    match state.provider.refresh_session(&tokens).await {
        Ok(RefreshOutcome::Valid(user)) => (RequestSession::Authenticated { user, tokens }, None),
        Ok(RefreshOutcome::Refreshed(session)) => {
            tracing::debug!(user_id = %session.user.id, "Session tokens rotated");
            let rotated = session.tokens.clone();
            (
                RequestSession::Authenticated {
                    user: session.user,
                    tokens: session.tokens,
                },
                Some(rotated),
            )
        }
        Err(err) => {
            tracing::warn!(path = %path, error = %err, "Session refresh failed, continuing unauthenticated");
            (RequestSession::Anonymous, None)
        }
    }
}
