use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::get, Router};
use shadow_auth::{auth_routes, refresh_session, AuthState};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::handlers::{home, livez};

/// Create the application router with all routes and middleware.
///
/// The liveness probe and `extra` routes (the development mock IdP) are
/// mounted outside the session refresher.
pub fn create_app(state: AuthState, extra: Option<Router>) -> Router {
    let mut app = Router::new()
        .route("/", get(home))
        .merge(auth_routes())
        .layer(middleware::from_fn_with_state(state.clone(), refresh_session))
        .with_state(state)
        .route("/livez", get(livez));

    if let Some(extra) = extra {
        app = app.merge(extra);
    }

    app.layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, Response},
    };
    use http_body_util::BodyExt;
    use shadow_auth::{mock_idp::mock_idp_routes, AuthConfig, MemoryProfileStore, MemoryProvider};
    use shadow_core::auth::RouteEnforcement;
    use tower::ServiceExt;

    fn dev_app(config: AuthConfig) -> Router {
        let provider = Arc::new(MemoryProvider::new());
        let profiles = MemoryProfileStore::new();
        let state = AuthState::new(provider.clone(), Arc::new(profiles.clone()), config);
        create_app(state, Some(mock_idp_routes(provider, profiles)))
    }

    async fn get_with_cookie(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        app.clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn location(response: &Response<Body>) -> String {
        response.headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string()
    }

    /// `name=value` pairs from Set-Cookie headers, joined for a Cookie header.
    fn cookie_header(response: &Response<Body>) -> String {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .collect::<Vec<_>>()
            .join("; ")
    }

    async fn json(response: Response<Body>) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_livez() {
        let app = dev_app(AuthConfig::default());
        let response = get_with_cookie(&app, "/livez", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_home_anonymous() {
        let app = dev_app(AuthConfig::default());
        let response = get_with_cookie(&app, "/", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["authenticated"], false);
    }

    #[tokio::test]
    async fn test_first_sign_in_lands_on_onboarding_then_session_sticks() {
        let app = dev_app(AuthConfig::default());

        let response =
            get_with_cookie(&app, "/mock-idp/authorize?email=new%40example.com", None).await;
        assert!(response.status().is_redirection());
        let callback = location(&response);
        assert!(callback.starts_with("/auth/callback?code="));

        let response = get_with_cookie(&app, &callback, None).await;
        let destination = location(&response);
        assert!(destination.starts_with("/update-profile/"));
        assert!(destination.ends_with("?onboarding=true"));
        let cookies = cookie_header(&response);

        let response = get_with_cookie(&app, "/", Some(&cookies)).await;
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let body = json(response).await;
        assert_eq!(body["authenticated"], true);
        assert!(destination.contains(body["user_id"].as_str().unwrap()));

        let response = get_with_cookie(&app, "/auth/me", Some(&cookies)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["email"], "new@example.com");
    }

    #[tokio::test]
    async fn test_replayed_callback_shows_error() {
        let app = dev_app(AuthConfig::default());
        let response =
            get_with_cookie(&app, "/mock-idp/authorize?email=new%40example.com", None).await;
        let callback = location(&response);

        get_with_cookie(&app, &callback, None).await;
        let replay = get_with_cookie(&app, &callback, None).await;
        let error_page = location(&replay);
        assert!(error_page.starts_with("/auth/auth-code-error?error="));

        let response = get_with_cookie(&app, &error_page, None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_enforced_routes_redirect_anonymous_users() {
        let app = dev_app(AuthConfig {
            route_enforcement: RouteEnforcement::Enforce,
            ..Default::default()
        });

        let response = get_with_cookie(&app, "/auth/me", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/sign-in");

        for open in ["/", "/livez", "/auth/auth-code-error"] {
            let response = get_with_cookie(&app, open, None).await;
            assert_eq!(response.status(), StatusCode::OK, "{open}");
        }
    }
}
