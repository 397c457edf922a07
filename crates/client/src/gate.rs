//! Onboarding gate.
//!
//! Runs the pure [`decide`] function against the session store and durable
//! storage, then performs its side effects: the self-heal record write and
//! the navigation. Onboarding decisions happen at most once per session
//! lifetime.

use std::sync::Arc;

use shadow_core::auth::is_public_route;
use shadow_core::onboarding::{
    decide, read_record, write_record, GateDecision, GateLatch, GatePhase, KeyValueStore,
    NavigationDecision,
};

use crate::store::SessionSnapshot;

/// Performs a full navigation, dropping in-memory client state.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

pub struct OnboardingGate<N> {
    storage: Arc<dyn KeyValueStore>,
    navigator: N,
    latch: GateLatch,
}

impl<N: Navigator> OnboardingGate<N> {
    pub fn new(storage: Arc<dyn KeyValueStore>, navigator: N) -> Self {
        Self {
            storage,
            navigator,
            latch: GateLatch::new(),
        }
    }

    /// Evaluate the gate for `current_path`.
    ///
    /// A signed-out user on a protected path is sent to sign-in on every
    /// call. Decisions about a signed-in user happen at most once per
    /// session lifetime; later calls in the same lifetime return `None`.
    pub fn evaluate(&self, snapshot: &SessionSnapshot, current_path: &str) -> Option<GateDecision> {
        let checked = self.latch.phase(snapshot.epoch) == GatePhase::Checked;
        let record = if checked {
            None
        } else {
            snapshot.state.user_id().and_then(|user_id| {
                read_record(self.storage.as_ref(), user_id)
                    .inspect_err(|e| {
                        tracing::warn!(%user_id, error = %e, "Unreadable onboarding record, treating as absent");
                    })
                    .ok()
                    .flatten()
            })
        };

        let decision = decide(&snapshot.state, record, current_path);
        if !decision.consumes_check() {
            if let NavigationDecision::RedirectTo(path) = decision.navigation() {
                if !is_public_route(current_path) {
                    tracing::debug!(from = current_path, to = %path, "Signed out, redirecting");
                    self.navigator.navigate(&path);
                }
            }
            return Some(decision);
        }
        if checked || !self.latch.try_check(snapshot.epoch) {
            return None;
        }

        if let Some((user_id, status)) = decision.record_write() {
            match write_record(self.storage.as_ref(), user_id, status) {
                Ok(recorded) => tracing::info!(%user_id, status = %recorded, "Onboarding record healed"),
                Err(e) => tracing::warn!(%user_id, error = %e, "Failed to write onboarding record"),
            }
        }

        if let NavigationDecision::RedirectTo(path) = decision.navigation() {
            tracing::info!(from = current_path, to = %path, "Onboarding gate redirect");
            self.navigator.navigate(&path);
        }

        Some(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::store::{ClientSessionStore, SessionEvent};
    use shadow_core::onboarding::OnboardingStatus;
    use shadow_core::profile::UserProfile;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Clone, Default)]
    struct RecordingNavigator(Arc<Mutex<Vec<String>>>);

    impl RecordingNavigator {
        fn visits(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, path: &str) {
            self.0.lock().unwrap().push(path.to_string());
        }
    }

    struct Fixture {
        storage: Arc<MemoryStorage>,
        navigator: RecordingNavigator,
        gate: OnboardingGate<RecordingNavigator>,
        store: ClientSessionStore,
    }

    fn fixture() -> Fixture {
        let storage = Arc::new(MemoryStorage::new());
        let navigator = RecordingNavigator::default();
        Fixture {
            gate: OnboardingGate::new(storage.clone(), navigator.clone()),
            storage,
            navigator,
            store: ClientSessionStore::new(),
        }
    }

    fn bare_profile() -> UserProfile {
        UserProfile::new(Uuid::new_v4(), "new@example.com", "New User")
    }

    #[test]
    fn incomplete_profile_redirects_once_across_three_evaluations() {
        let f = fixture();
        let user = bare_profile();
        f.store.apply(SessionEvent::SignedIn(user.clone()));

        for _ in 0..3 {
            f.gate.evaluate(&f.store.snapshot(), "/");
        }

        assert_eq!(
            f.navigator.visits(),
            vec![format!("/update-profile/{}?onboarding=true", user.id)]
        );
        assert_eq!(read_record(f.storage.as_ref(), user.id).unwrap(), None);
    }

    #[test]
    fn loading_does_not_consume_the_check() {
        let f = fixture();
        assert_eq!(
            f.gate.evaluate(&f.store.snapshot(), "/"),
            Some(GateDecision::Pending)
        );

        let user = bare_profile();
        f.store.apply(SessionEvent::SignedIn(user.clone()));
        assert_eq!(
            f.gate.evaluate(&f.store.snapshot(), "/"),
            Some(GateDecision::Onboard { user_id: user.id })
        );
    }

    #[test]
    fn settled_record_never_redirects() {
        for status in [OnboardingStatus::Completed, OnboardingStatus::Skipped] {
            let f = fixture();
            let user = bare_profile();
            write_record(f.storage.as_ref(), user.id, status).unwrap();

            f.store.apply(SessionEvent::SignedIn(user.clone()));
            f.gate.evaluate(&f.store.snapshot(), "/");
            f.store.apply(SessionEvent::SignedOut);
            f.store.apply(SessionEvent::SignedIn(user));
            f.gate.evaluate(&f.store.snapshot(), "/");

            assert!(f.navigator.visits().is_empty());
        }
    }

    #[test]
    fn complete_profile_self_heals_without_redirect() {
        let f = fixture();
        let user = bare_profile().with_bio("Hello").with_avatar("https://cdn/a.png");
        f.store.apply(SessionEvent::SignedIn(user.clone()));

        let decision = f.gate.evaluate(&f.store.snapshot(), "/");

        assert_eq!(decision, Some(GateDecision::SelfHeal { user_id: user.id }));
        assert!(f.navigator.visits().is_empty());
        assert_eq!(
            read_record(f.storage.as_ref(), user.id).unwrap(),
            Some(OnboardingStatus::Completed)
        );
    }

    #[test]
    fn completion_route_marks_checked_without_redirect() {
        let f = fixture();
        let user = bare_profile();
        f.store.apply(SessionEvent::SignedIn(user.clone()));
        let path = format!("/update-profile/{}?onboarding=true", user.id);

        assert_eq!(
            f.gate.evaluate(&f.store.snapshot(), &path),
            Some(GateDecision::OnCompletionRoute)
        );
        assert_eq!(f.gate.evaluate(&f.store.snapshot(), "/"), None);
        assert!(f.navigator.visits().is_empty());
    }

    #[test]
    fn new_sign_in_rearms_the_gate() {
        let f = fixture();
        let user = bare_profile();
        f.store.apply(SessionEvent::SignedIn(user.clone()));
        f.gate.evaluate(&f.store.snapshot(), "/");

        f.store.apply(SessionEvent::SignedOut);
        f.store.apply(SessionEvent::SignedIn(user));
        f.gate.evaluate(&f.store.snapshot(), "/");

        assert_eq!(f.navigator.visits().len(), 2);
    }

    #[test]
    fn signed_out_redirects_on_protected_paths_only() {
        let f = fixture();
        f.store.apply(SessionEvent::SignedOut);
        let snapshot = f.store.snapshot();

        assert_eq!(f.gate.evaluate(&snapshot, "/"), Some(GateDecision::SignIn));
        assert_eq!(f.gate.evaluate(&snapshot, "/saved"), Some(GateDecision::SignIn));

        assert_eq!(f.navigator.visits(), vec!["/sign-in".to_string()]);
    }

    #[test]
    fn signed_out_redirect_does_not_consume_the_check() {
        let f = fixture();
        f.store.apply(SessionEvent::SignedOut);
        f.gate.evaluate(&f.store.snapshot(), "/saved");
        f.gate.evaluate(&f.store.snapshot(), "/saved");
        assert_eq!(f.navigator.visits().len(), 2);

        let f = fixture();
        f.store.apply(SessionEvent::SignedOut);
        f.gate.evaluate(&f.store.snapshot(), "/sign-in");
        assert!(f.navigator.visits().is_empty());
    }

    struct BrokenStorage;

    impl KeyValueStore for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, shadow_core::onboarding::StorageError> {
            Err(std::io::Error::other("disk gone").into())
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), shadow_core::onboarding::StorageError> {
            Err(std::io::Error::other("disk gone").into())
        }
    }

    #[test]
    fn unreadable_record_is_treated_as_absent() {
        let navigator = RecordingNavigator::default();
        let gate = OnboardingGate::new(Arc::new(BrokenStorage), navigator.clone());
        let store = ClientSessionStore::new();
        let user = bare_profile();
        store.apply(SessionEvent::SignedIn(user.clone()));

        gate.evaluate(&store.snapshot(), "/");
        assert_eq!(navigator.visits().len(), 1);
    }
}
