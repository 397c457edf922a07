//! HTTP handlers for auth routes.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use shadow_core::auth::{
    classify_callback, failure_destination, normalize_email, post_login_destination,
    AuthError as CoreError, CallbackParams, CallbackStep, Destination, ExchangeCode, FlowType,
    FORGOT_PASSWORD_PATH, GENERIC_AUTH_FAILURE, SIGN_IN_PATH,
};
use shadow_core::profile::{ProfileError, UserProfile};

use crate::cookies;
use crate::error::AuthError;
use crate::extractors::CurrentSession;
use crate::AuthState;

/// Query parameters for the error page.
#[derive(Deserialize, Default)]
pub struct ErrorPageQuery {
    pub error: Option<String>,
}

/// Body of a password recovery request.
#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ForgotPasswordResponse {
    pub status: String,
}

/// Creates the auth router with all authentication routes.
///
/// Routes:
/// - `GET /auth/callback` - Redeem a one-time code and pick the landing page
/// - `GET /auth/auth-code-error` - Display an authentication failure
/// - `POST /auth/forgot-password` - Send a password recovery email
/// - `POST /auth/sign-out` - Clear the session cookies
/// - `GET /auth/me` - Get the current user's profile
/// - `GET /reset-password` - Legacy alias for the forgot-password page
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/auth/callback", get(callback))
        .route("/auth/auth-code-error", get(error_page))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/sign-out", post(sign_out))
        .route("/auth/me", get(me))
        .route("/reset-password", get(reset_password))
}

async fn callback(
    State(state): State<AuthState>,
    jar: CookieJar,
    params: Result<Query<CallbackParams>, QueryRejection>,
) -> (CookieJar, Redirect) {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Malformed callback query");
            CallbackParams::default()
        }
    };

    let (jar, destination) = match classify_callback(&params) {
        CallbackStep::ProviderError(message) => {
            tracing::warn!(message = %message, "Identity provider reported an error");
            (jar, Destination::error(message))
        }
        CallbackStep::InvalidLink => {
            tracing::warn!("Callback reached without code or error");
            (jar, failure_destination(&CoreError::InvalidLink))
        }
        CallbackStep::Exchange { code, flow } => exchange(&state, jar, code, flow).await,
    };

    (jar, Redirect::to(&destination.to_path()))
}

/// Redeem the code exactly once; never retried.
async fn exchange(
    state: &AuthState,
    jar: CookieJar,
    code: String,
    flow: FlowType,
) -> (CookieJar, Destination) {
    let (jar, verifier) = cookies::take_verifier(jar, &state.config);
    let code = ExchangeCode::new(code).with_verifier(verifier);

    match state.provider.exchange_code(&code).await {
        Ok(session) => {
            let destination =
                post_login_destination(&session.user, flow, state.config.new_user_policy);
            tracing::info!(
                user_id = %session.user.id,
                flow = ?flow,
                destination = ?destination,
                "Authentication successful"
            );
            let jar = cookies::write_tokens(jar, &state.config, &session.tokens);
            (jar, destination)
        }
        Err(err) => {
            tracing::warn!(error = %err, "Code exchange failed");
            (jar, failure_destination(&err))
        }
    }
}

async fn error_page(Query(query): Query<ErrorPageQuery>) -> String {
    query
        .error
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| GENERIC_AUTH_FAILURE.to_string())
}

async fn forgot_password(
    State(state): State<AuthState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<ForgotPasswordResponse>, AuthError> {
    let email = normalize_email(&body.email);
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::InvalidEmail);
    }

    state
        .profiles
        .find_by_email(&email)
        .await?
        .ok_or(AuthError::AccountNotFound)?;

    let redirect_to = state.config.recovery_redirect()?;
    state
        .provider
        .send_recovery_email(&email, redirect_to.as_str())
        .await?;

    tracing::info!("Recovery email requested");
    Ok(Json(ForgotPasswordResponse {
        status: "sent".to_string(),
    }))
}

async fn sign_out(State(state): State<AuthState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = cookies::clear_tokens(jar, &state.config);
    (jar, Redirect::to(SIGN_IN_PATH))
}

async fn me(
    State(state): State<AuthState>,
    session: CurrentSession,
) -> Result<Json<UserProfile>, AuthError> {
    let profile = state
        .profiles
        .get_profile(session.user.id)
        .await?
        .ok_or(ProfileError::NotFound(session.user.id))?;
    Ok(Json(profile))
}

async fn reset_password() -> Redirect {
    Redirect::to(FORGOT_PASSWORD_PATH)
}
