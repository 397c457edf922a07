//! Client session store.
//!
//! Holds the current identity and loading state for one client context.
//! Every change in identity (sign-in, sign-out, a different user) starts a
//! new session lifetime and increments the snapshot's `epoch`.

use std::sync::Arc;

use shadow_core::auth::SessionState;
use shadow_core::profile::UserProfile;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::source::SessionSource;

/// Session state plus the lifetime it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub epoch: u64,
}

/// Session-change notifications from the identity provider.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    SignedIn(UserProfile),
    SignedOut,
    TokenRefreshed(UserProfile),
    UserUpdated(UserProfile),
}

#[derive(Debug, Clone)]
pub struct ClientSessionStore {
    tx: Arc<watch::Sender<SessionSnapshot>>,
}

impl Default for ClientSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientSessionStore {
    /// A store that has not resolved yet (`is_loading = true`).
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot {
            state: SessionState::loading(),
            epoch: 1,
        });
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    /// Receives every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// Resolve the initial session.
    ///
    /// Always ends with `is_loading = false`. A source failure resolves as
    /// signed out. If an event already resolved the store, the event wins.
    pub async fn hydrate(&self, source: &dyn SessionSource) -> SessionSnapshot {
        let resolved = match source.current_user().await {
            Ok(Some(user)) => SessionState::signed_in(user),
            Ok(None) => SessionState::signed_out(),
            Err(e) => {
                tracing::warn!(error = %e, "Session hydration failed, treating as signed out");
                SessionState::signed_out()
            }
        };

        self.tx.send_if_modified(|snapshot| {
            if !snapshot.state.is_loading {
                return false;
            }
            replace(snapshot, resolved);
            true
        });

        let snapshot = self.snapshot();
        tracing::debug!(
            authenticated = snapshot.state.is_authenticated,
            epoch = snapshot.epoch,
            "Session hydrated"
        );
        snapshot
    }

    pub fn apply(&self, event: SessionEvent) {
        match event {
            SessionEvent::SignedIn(user) | SessionEvent::TokenRefreshed(user) => {
                self.transition(SessionState::signed_in(user));
            }
            SessionEvent::SignedOut => self.transition(SessionState::signed_out()),
            SessionEvent::UserUpdated(user) => {
                self.set_user(user);
            }
        }
    }

    /// Optimistically replace the signed-in user's profile.
    ///
    /// Ignored (returns `false`) unless `profile` belongs to the current user.
    pub fn set_user(&self, profile: UserProfile) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.state.user_id() != Some(profile.id) {
                return false;
            }
            snapshot.state.user = Some(profile);
            true
        })
    }

    /// Apply session events until the sender side closes.
    pub fn listen(&self, mut events: broadcast::Receiver<SessionEvent>) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => store.apply(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Session listener lagged behind");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    fn transition(&self, next: SessionState) {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.state == next {
                return false;
            }
            replace(snapshot, next);
            true
        });
    }
}

fn replace(snapshot: &mut SessionSnapshot, next: SessionState) {
    let identity_changed = snapshot.state.is_authenticated != next.is_authenticated
        || snapshot.state.user_id() != next.user_id();
    if identity_changed {
        snapshot.epoch += 1;
    }
    snapshot.state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClientError, Result};
    use async_trait::async_trait;
    use uuid::Uuid;

    enum StubSource {
        User(UserProfile),
        Anonymous,
        Broken,
    }

    #[async_trait]
    impl SessionSource for StubSource {
        async fn current_user(&self) -> Result<Option<UserProfile>> {
            match self {
                Self::User(user) => Ok(Some(user.clone())),
                Self::Anonymous => Ok(None),
                Self::Broken => Err(ClientError::InvalidInput("offline".to_string())),
            }
        }
    }

    fn profile() -> UserProfile {
        UserProfile::new(Uuid::new_v4(), "jane@example.com", "Jane")
    }

    #[tokio::test]
    async fn starts_loading() {
        let store = ClientSessionStore::new();
        assert!(store.snapshot().state.is_loading);
    }

    #[tokio::test]
    async fn hydrate_resolves_signed_in() {
        let store = ClientSessionStore::new();
        let user = profile();
        let snapshot = store.hydrate(&StubSource::User(user.clone())).await;

        assert!(!snapshot.state.is_loading);
        assert!(snapshot.state.is_authenticated);
        assert_eq!(snapshot.state.user, Some(user));
    }

    #[tokio::test]
    async fn hydrate_resolves_even_when_source_fails() {
        let store = ClientSessionStore::new();
        for source in [StubSource::Anonymous, StubSource::Broken] {
            let snapshot = store.hydrate(&source).await;
            assert!(!snapshot.state.is_loading);
            assert!(!snapshot.state.is_authenticated);
        }
    }

    #[tokio::test]
    async fn hydrate_does_not_clobber_an_earlier_event() {
        let store = ClientSessionStore::new();
        let user = profile();
        store.apply(SessionEvent::SignedIn(user.clone()));

        let snapshot = store.hydrate(&StubSource::Anonymous).await;
        assert_eq!(snapshot.state.user_id(), Some(user.id));
    }

    #[tokio::test]
    async fn identity_changes_start_new_epochs() {
        let store = ClientSessionStore::new();
        let user = profile();

        store.apply(SessionEvent::SignedIn(user.clone()));
        let signed_in = store.snapshot().epoch;

        store.apply(SessionEvent::TokenRefreshed(user.clone()));
        store.apply(SessionEvent::SignedIn(user.clone()));
        assert_eq!(store.snapshot().epoch, signed_in);

        store.apply(SessionEvent::SignedOut);
        let signed_out = store.snapshot().epoch;
        assert!(signed_out > signed_in);

        store.apply(SessionEvent::SignedIn(user));
        assert!(store.snapshot().epoch > signed_out);
    }

    #[tokio::test]
    async fn set_user_only_touches_current_user() {
        let store = ClientSessionStore::new();
        let user = profile();
        store.apply(SessionEvent::SignedIn(user.clone()));
        let epoch = store.snapshot().epoch;

        assert!(!store.set_user(profile()));
        assert!(store.set_user(user.clone().with_bio("Hello")));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.epoch, epoch);
        assert!(snapshot.state.user.unwrap().has_bio());
    }

    #[tokio::test]
    async fn listener_applies_events_until_closed() {
        let store = ClientSessionStore::new();
        let mut changes = store.subscribe();
        let (tx, rx) = broadcast::channel(8);
        let handle = store.listen(rx);

        let user = profile();
        tx.send(SessionEvent::SignedIn(user.clone())).unwrap();
        changes.changed().await.unwrap();
        assert_eq!(changes.borrow().state.user_id(), Some(user.id));

        drop(tx);
        handle.await.unwrap();
    }
}
