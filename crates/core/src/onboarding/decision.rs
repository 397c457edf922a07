use crate::auth::{SessionState, UPDATE_PROFILE_PATH};
use crate::profile::UserProfile;

use super::{GateDecision, OnboardingStatus};

/// True for `/update-profile`, `/update-profile/...` and `/update-profile?...`.
pub fn is_completion_route(path: &str) -> bool {
    path.strip_prefix(UPDATE_PROFILE_PATH)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'))
}

/// A profile is incomplete when it has neither a bio nor an avatar.
pub fn is_profile_incomplete(profile: &UserProfile) -> bool {
    !profile.has_bio() && !profile.has_avatar()
}

/// Pure gate decision.
///
/// `record` is the onboarding record of `state.user`, if any.
pub fn decide(
    state: &SessionState,
    record: Option<OnboardingStatus>,
    current_path: &str,
) -> GateDecision {
    if state.is_loading {
        return GateDecision::Pending;
    }
    if !state.is_authenticated {
        return GateDecision::SignIn;
    }
    let Some(user) = state.user.as_ref() else {
        return GateDecision::Pending;
    };

    if is_completion_route(current_path) {
        return GateDecision::OnCompletionRoute;
    }
    if let Some(status) = record {
        return GateDecision::Settled(status);
    }
    if is_profile_incomplete(user) {
        GateDecision::Onboard { user_id: user.id }
    } else {
        GateDecision::SelfHeal { user_id: user.id }
    }
}
