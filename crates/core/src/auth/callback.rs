//! Decisions taken by the code-exchange callback.
//!
//! The shell performs the single provider call; everything before and after
//! it is decided here so it can be tested without a network.

use std::str::FromStr;

use chrono::Duration;
use serde::Deserialize;
use uuid::Uuid;

use super::routes::{ERROR_PATH, HOME_PATH, UPDATE_PASSWORD_PATH, UPDATE_PROFILE_PATH};
use super::{AuthError, AuthUser, FlowType};

/// Query string of `GET /auth/callback`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub flow_type: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// What the callback has to do with the parameters it received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackStep {
    /// The provider reported a failure before redirecting.
    ProviderError(String),
    /// Redeem the code, then route according to the flow.
    Exchange { code: String, flow: FlowType },
    InvalidLink,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub fn classify_callback(params: &CallbackParams) -> CallbackStep {
    if let Some(error) = non_empty(&params.error) {
        let message = non_empty(&params.error_description).unwrap_or(error);
        return CallbackStep::ProviderError(message.to_string());
    }

    match non_empty(&params.code) {
        Some(code) => CallbackStep::Exchange {
            code: code.to_string(),
            flow: FlowType::from_param(params.flow_type.as_deref()),
        },
        None => CallbackStep::InvalidLink,
    }
}

/// How a successful non-recovery login decides between onboarding and home.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewUserPolicy {
    /// New when the email was confirmed within `window` of account creation.
    AccountAge { window: Duration },
    /// Never onboard from the callback; the client gate still runs.
    AlwaysHome,
    /// Trust the provider's explicit first-login flag.
    ProviderFlag,
}

impl NewUserPolicy {
    pub const DEFAULT_WINDOW_HOURS: i64 = 24;

    pub fn account_age_hours(hours: i64) -> Self {
        Self::AccountAge {
            window: Duration::hours(hours),
        }
    }

    pub fn is_new_user(&self, user: &AuthUser) -> bool {
        match self {
            Self::AccountAge { window } => match (user.email_confirmed_at, user.created_at) {
                (Some(confirmed_at), Some(created_at)) => confirmed_at - created_at < *window,
                _ => false,
            },
            Self::AlwaysHome => false,
            Self::ProviderFlag => user.is_first_login.unwrap_or(false),
        }
    }
}

impl Default for NewUserPolicy {
    fn default() -> Self {
        Self::account_age_hours(Self::DEFAULT_WINDOW_HOURS)
    }
}

impl FromStr for NewUserPolicy {
    type Err = String;

    /// Parses the policy name; `account-age` uses the default window.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "account-age" => Ok(Self::default()),
            "always-home" => Ok(Self::AlwaysHome),
            "provider-flag" => Ok(Self::ProviderFlag),
            other => Err(format!("unknown new-user policy '{}'", other)),
        }
    }
}

/// Where the callback sends the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Home,
    UpdatePassword,
    CompleteProfile { user_id: Uuid },
    Error { message: String },
}

impl Destination {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Relative URL for the redirect.
    pub fn to_path(&self) -> String {
        match self {
            Self::Home => HOME_PATH.to_string(),
            Self::UpdatePassword => UPDATE_PASSWORD_PATH.to_string(),
            Self::CompleteProfile { user_id } => onboarding_path(*user_id),
            Self::Error { message } => {
                format!("{}?error={}", ERROR_PATH, urlencoding::encode(message))
            }
        }
    }
}

/// `/update-profile/{id}?onboarding=true`
pub fn onboarding_path(user_id: Uuid) -> String {
    format!("{}/{}?onboarding=true", UPDATE_PROFILE_PATH, user_id)
}

/// Destination after a successful exchange.
pub fn post_login_destination(user: &AuthUser, flow: FlowType, policy: NewUserPolicy) -> Destination {
    match flow {
        FlowType::Recovery => Destination::UpdatePassword,
        FlowType::Login if policy.is_new_user(user) => Destination::CompleteProfile { user_id: user.id },
        FlowType::Login => Destination::Home,
    }
}

/// Destination after a failed exchange.
pub fn failure_destination(error: &AuthError) -> Destination {
    Destination::error(error.user_message())
}
