//! Where the client learns about an existing session.

use async_trait::async_trait;
use reqwest::header::COOKIE;
use shadow_core::profile::UserProfile;

use crate::error::{ClientError, Result};

/// Resolves the session the client context starts with.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// `Ok(None)` when there is no signed-in user.
    async fn current_user(&self) -> Result<Option<UserProfile>>;
}

/// Reads the current user from the server's `/auth/me` endpoint.
#[derive(Debug, Clone)]
pub struct HttpSessionSource {
    client: reqwest::Client,
    base_url: String,
    cookie: Option<String>,
}

impl HttpSessionSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cookie: None,
        }
    }

    /// Sends the given session cookies with every request.
    pub fn with_tokens(mut self, prefix: &str, access_token: &str, refresh_token: &str) -> Self {
        self.cookie = Some(format!(
            "{prefix}-access-token={access_token}; {prefix}-refresh-token={refresh_token}"
        ));
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl SessionSource for HttpSessionSource {
    async fn current_user(&self) -> Result<Option<UserProfile>> {
        let mut request = self.client.get(self.url("/auth/me"));
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }
        let response = request.send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(Some(response.json().await?))
        } else if status.as_u16() == 401 {
            Ok(None)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(ClientError::ServerError {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_header_uses_prefix() {
        let source = HttpSessionSource::new("http://localhost:3000/").with_tokens("sb", "a", "r");
        assert_eq!(source.url("/auth/me"), "http://localhost:3000/auth/me");
        assert_eq!(
            source.cookie.as_deref(),
            Some("sb-access-token=a; sb-refresh-token=r")
        );
    }
}
