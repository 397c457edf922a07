use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::UserProfile;

/// Access/refresh token pair carried in the session cookies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Identity as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub email_confirmed_at: Option<DateTime<Utc>>,
    /// Explicit first-login marker, when the provider issues one.
    #[serde(default)]
    pub is_first_login: Option<bool>,
}

/// Authenticated session. Replaced wholesale on refresh or re-login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: AuthUser,
    pub tokens: SessionTokens,
    pub expires_at: DateTime<Utc>,
}

/// One-time code handed back by the provider, plus the PKCE verifier when
/// the login was started with one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeCode {
    pub code: String,
    pub verifier: Option<String>,
}

impl ExchangeCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            verifier: None,
        }
    }

    pub fn with_verifier(mut self, verifier: Option<String>) -> Self {
        self.verifier = verifier;
        self
    }
}

/// Flow marker carried by the callback's `type` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowType {
    Login,
    Recovery,
}

impl FlowType {
    /// Only `recovery` is recognized; anything else is a normal login.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("recovery") => Self::Recovery,
            _ => Self::Login,
        }
    }
}

/// Result of asking the provider to validate the current tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Tokens are still valid; nothing to rewrite.
    Valid(AuthUser),
    /// The provider rotated the tokens.
    Refreshed(Session),
}

/// Client-side view of the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub user: Option<UserProfile>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl SessionState {
    /// State before hydration has resolved.
    pub fn loading() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_loading: true,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_loading: false,
        }
    }

    pub fn signed_in(user: UserProfile) -> Self {
        Self {
            user: Some(user),
            is_authenticated: true,
            is_loading: false,
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_type_recognizes_recovery_only() {
        assert_eq!(FlowType::from_param(Some("recovery")), FlowType::Recovery);
        assert_eq!(FlowType::from_param(Some("signup")), FlowType::Login);
        assert_eq!(FlowType::from_param(Some("RECOVERY")), FlowType::Login);
        assert_eq!(FlowType::from_param(None), FlowType::Login);
    }

    #[test]
    fn session_state_defaults_to_loading() {
        let state = SessionState::default();
        assert!(state.is_loading);
        assert!(!state.is_authenticated);
        assert!(state.user_id().is_none());
    }
}
