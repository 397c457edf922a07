//! Per-request session published by the refresher.

use shadow_core::auth::{AuthUser, SessionTokens};

/// Session state for the current request.
///
/// Inserted into the request extensions by the refresher after validating
/// (and possibly rotating) the cookies. Downstream code reads this instead
/// of re-parsing cookies, so it always sees the post-refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestSession {
    Anonymous,
    Authenticated {
        user: AuthUser,
        tokens: SessionTokens,
    },
}

impl RequestSession {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Self::Authenticated { user, .. } => Some(user),
            Self::Anonymous => None,
        }
    }
}
