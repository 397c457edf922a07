//! GoTrue (Supabase Auth) REST client.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use shadow_core::auth::{
    AuthError, AuthUser, ExchangeCode, IdentityProvider, RefreshOutcome, Result, Session,
    SessionTokens,
};
use url::Url;
use uuid::Uuid;

/// Identity provider backed by a GoTrue-compatible REST API.
#[derive(Debug, Clone)]
pub struct GoTrueProvider {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: GoTrueUser,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: Uuid,
    email: Option<String>,
    created_at: Option<DateTime<Utc>>,
    email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    user_metadata: serde_json::Value,
}

/// GoTrue reports errors under several shapes depending on the endpoint.
#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl ErrorResponse {
    fn into_message(self) -> String {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
            .unwrap_or_default()
    }
}

impl From<GoTrueUser> for AuthUser {
    fn from(user: GoTrueUser) -> Self {
        let is_first_login = user
            .user_metadata
            .get("is_first_login")
            .and_then(serde_json::Value::as_bool);
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            email_confirmed_at: user.email_confirmed_at,
            is_first_login,
        }
    }
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(|| now + Duration::seconds(self.expires_in.unwrap_or(3600)));
        Session {
            user: self.user.into(),
            tokens: SessionTokens {
                access_token: self.access_token,
                refresh_token: self.refresh_token,
            },
            expires_at,
        }
    }
}

impl GoTrueProvider {
    /// Create a client for `base_url` (e.g. `https://<ref>.supabase.co/auth/v1`).
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Build a URL for an endpoint, keeping the base path.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{}/{}", base, path)).map_err(|e| AuthError::Provider(e.to_string()))
    }

    async fn token_grant(&self, grant_type: &str, body: serde_json::Value) -> Result<reqwest::Response> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);

        self.client
            .post(url)
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(network_error)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session> {
        let response = self
            .token_grant(
                "refresh_token",
                serde_json::json!({ "refresh_token": refresh_token }),
            )
            .await?;

        match response.status() {
            status if status.is_success() => parse_session(response).await,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(AuthError::Unauthorized)
            }
            _ => Err(AuthError::Provider(error_message(response).await)),
        }
    }
}

fn network_error(err: reqwest::Error) -> AuthError {
    AuthError::Provider(err.to_string())
}

async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body: ErrorResponse = response.json().await.unwrap_or_default();
    let message = body.into_message();
    if message.is_empty() {
        format!("provider returned {}", status)
    } else {
        message
    }
}

async fn parse_session(response: reqwest::Response) -> Result<Session> {
    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| AuthError::Provider(format!("invalid token response: {}", e)))?;
    Ok(token.into_session(Utc::now()))
}

#[async_trait]
impl IdentityProvider for GoTrueProvider {
    async fn exchange_code(&self, code: &ExchangeCode) -> Result<Session> {
        let response = self
            .token_grant(
                "pkce",
                serde_json::json!({
                    "auth_code": code.code,
                    "code_verifier": code.verifier,
                }),
            )
            .await
            .map_err(|e| AuthError::CodeExchange(e.user_message()))?;

        if !response.status().is_success() {
            return Err(AuthError::CodeExchange(error_message(response).await));
        }
        parse_session(response).await
    }

    async fn refresh_session(&self, tokens: &SessionTokens) -> Result<RefreshOutcome> {
        match self.get_user(&tokens.access_token).await {
            Ok(user) => Ok(RefreshOutcome::Valid(user)),
            Err(AuthError::Unauthorized) => self
                .refresh(&tokens.refresh_token)
                .await
                .map(RefreshOutcome::Refreshed),
            Err(err) => Err(err),
        }
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser> {
        let response = self
            .client
            .get(self.endpoint("user")?)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(network_error)?;

        match response.status() {
            status if status.is_success() => response
                .json::<GoTrueUser>()
                .await
                .map(AuthUser::from)
                .map_err(|e| AuthError::Provider(format!("invalid user response: {}", e))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::Unauthorized),
            _ => Err(AuthError::Provider(error_message(response).await)),
        }
    }

    async fn send_recovery_email(&self, email: &str, redirect_to: &str) -> Result<()> {
        let mut url = self.endpoint("recover")?;
        url.query_pairs_mut().append_pair("redirect_to", redirect_to);

        let response = self
            .client
            .post(url)
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .map_err(network_error)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AuthError::Provider(error_message(response).await))
        }
    }
}
