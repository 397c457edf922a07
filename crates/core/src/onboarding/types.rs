use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{onboarding_path, SIGN_IN_PATH};

/// Terminal onboarding outcomes. Absence of a record means "not yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnboardingStatus {
    Completed,
    Skipped,
}

impl OnboardingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        }
    }

    /// Unknown values are treated as no record at all.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "completed" => Some(Self::Completed),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }
}

impl std::fmt::Display for OnboardingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Navigation side effect requested by a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Stay,
    /// Full (non-incremental) navigation; in-memory client state is dropped.
    RedirectTo(String),
}

/// Outcome of one gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Session still resolving; nothing may happen yet.
    Pending,
    /// Resolved without a session.
    SignIn,
    /// Already on the profile-completion route.
    OnCompletionRoute,
    /// A terminal record exists for this user.
    Settled(OnboardingStatus),
    /// Profile is incomplete: send the user to onboarding.
    Onboard { user_id: Uuid },
    /// Profile was completed elsewhere: record it, stay put.
    SelfHeal { user_id: Uuid },
}

impl GateDecision {
    /// Whether this decision consumes the one-shot check. Only decisions
    /// about an authenticated user do; `Pending` and `SignIn` are re-evaluated
    /// every time.
    pub fn consumes_check(&self) -> bool {
        !matches!(self, Self::Pending | Self::SignIn)
    }

    pub fn navigation(&self) -> NavigationDecision {
        match self {
            Self::SignIn => NavigationDecision::RedirectTo(SIGN_IN_PATH.to_string()),
            Self::Onboard { user_id } => NavigationDecision::RedirectTo(onboarding_path(*user_id)),
            _ => NavigationDecision::Stay,
        }
    }

    /// Record write the gate performs itself (only the self-heal case).
    pub fn record_write(&self) -> Option<(Uuid, OnboardingStatus)> {
        match self {
            Self::SelfHeal { user_id } => Some((*user_id, OnboardingStatus::Completed)),
            _ => None,
        }
    }
}
