//! Mock identity provider sign-in for local development.
//!
//! Stands in for the provider's hosted sign-in page: it registers (or finds)
//! the user in the [`MemoryProvider`], issues a one-time code and redirects
//! to the normal callback, so the full exchange path runs without a real
//! provider.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use shadow_core::auth::{AuthUser, CALLBACK_PATH};
use shadow_core::profile::{ProfileRepository, UserProfile};
use uuid::Uuid;

use crate::error::AuthError;
use crate::profiles::MemoryProfileStore;
use crate::providers::MemoryProvider;

#[derive(Clone)]
struct MockIdpState {
    provider: Arc<MemoryProvider>,
    profiles: MemoryProfileStore,
}

#[derive(Deserialize)]
struct AuthorizeQuery {
    email: String,
    name: Option<String>,
    /// Forwarded as the callback's `type` (e.g. `recovery`).
    #[serde(rename = "type")]
    flow_type: Option<String>,
}

/// Routes:
/// - `GET /mock-idp/authorize?email=..&name=..&type=..` - sign in and redirect to the callback
pub fn mock_idp_routes(provider: Arc<MemoryProvider>, profiles: MemoryProfileStore) -> Router {
    Router::new()
        .route("/mock-idp/authorize", get(authorize))
        .with_state(MockIdpState { provider, profiles })
}

async fn authorize(
    State(state): State<MockIdpState>,
    Query(query): Query<AuthorizeQuery>,
) -> Result<Redirect, AuthError> {
    let user = match state.provider.find_user_by_email(&query.email)? {
        Some(user) => user,
        None => {
            let now = Utc::now();
            let user = AuthUser {
                id: Uuid::new_v4(),
                email: Some(query.email.clone()),
                created_at: Some(now),
                email_confirmed_at: Some(now),
                is_first_login: Some(true),
            };
            state.provider.register_user(user.clone())?;
            tracing::info!(user_id = %user.id, "Mock IdP registered new user");
            user
        }
    };

    if state.profiles.get_profile(user.id).await?.is_none() {
        let name = query
            .name
            .clone()
            .unwrap_or_else(|| query.email.split('@').next().unwrap_or("User").to_string());
        state
            .profiles
            .insert(UserProfile::new(user.id, query.email.clone(), name))
            .await;
    }

    let code = state.provider.issue_code(user.id)?;
    let mut callback = format!("{}?code={}", CALLBACK_PATH, urlencoding::encode(&code));
    if let Some(flow_type) = query.flow_type.as_deref() {
        callback.push_str(&format!("&type={}", urlencoding::encode(flow_type)));
    }

    Ok(Redirect::to(&callback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn authorize_registers_user_and_redirects_with_code() {
        let provider = Arc::new(MemoryProvider::new());
        let profiles = MemoryProfileStore::new();
        let app = mock_idp_routes(provider.clone(), profiles.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/mock-idp/authorize?email=jane%40example.com&type=recovery")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let location = response.headers().get("location").unwrap().to_str().unwrap();
        assert!(location.starts_with("/auth/callback?code="));
        assert!(location.ends_with("&type=recovery"));

        let user = provider
            .find_user_by_email("jane@example.com")
            .unwrap()
            .unwrap();
        let profile = profiles.get_profile(user.id).await.unwrap().unwrap();
        assert_eq!(profile.name, "jane");
    }

    #[tokio::test]
    async fn returning_user_keeps_identity() {
        use shadow_core::auth::{ExchangeCode, IdentityProvider};

        let provider = Arc::new(MemoryProvider::new());
        let profiles = MemoryProfileStore::new();
        let app = mock_idp_routes(provider.clone(), profiles);

        let mut user_ids = Vec::new();
        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .uri("/mock-idp/authorize?email=bob%40example.com")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            let location = response.headers().get("location").unwrap().to_str().unwrap();
            let code = location
                .strip_prefix("/auth/callback?code=")
                .unwrap()
                .to_string();

            let session = provider.exchange_code(&ExchangeCode::new(code)).await.unwrap();
            user_ids.push(session.user.id);
        }

        assert_eq!(user_ids[0], user_ids[1]);
        let registered = provider.find_user_by_email("bob@example.com").unwrap().unwrap();
        assert_eq!(registered.id, user_ids[0]);
    }
}
