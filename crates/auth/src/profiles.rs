//! In-memory profile store for development and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use shadow_core::auth::normalize_email;
use shadow_core::profile::{ProfileError, ProfileRepository, ProfileUpdate, Result, UserProfile};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Stores profiles in a HashMap wrapped in `Arc<RwLock<_>>`.
/// Data is not persisted and will be lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    profiles: Arc<RwLock<HashMap<Uuid, UserProfile>>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile.
    pub async fn insert(&self, profile: UserProfile) {
        self.profiles.write().await.insert(profile.id, profile);
    }
}

#[async_trait]
impl ProfileRepository for MemoryProfileStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<UserProfile>> {
        Ok(self.profiles.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>> {
        let email = normalize_email(email);
        Ok(self
            .profiles
            .read()
            .await
            .values()
            .find(|p| normalize_email(&p.email) == email)
            .cloned())
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<UserProfile> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles.get_mut(&id).ok_or(ProfileError::NotFound(id))?;
        profile.apply(update);
        Ok(profile.clone())
    }
}
