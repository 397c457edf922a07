//! The profile-completion action: the only writer of the onboarding record
//! besides the gate's self-heal.

use std::sync::Arc;

use shadow_core::auth::HOME_PATH;
use shadow_core::onboarding::{write_record, KeyValueStore, OnboardingStatus};
use shadow_core::profile::{ProfileRepository, ProfileUpdate};
use uuid::Uuid;

use crate::error::Result;
use crate::store::ClientSessionStore;

pub struct ProfileCompletion {
    profiles: Arc<dyn ProfileRepository>,
    storage: Arc<dyn KeyValueStore>,
    store: ClientSessionStore,
    user_id: Uuid,
    onboarding: bool,
}

impl ProfileCompletion {
    /// `onboarding` is true when the page was opened with `?onboarding=true`.
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        storage: Arc<dyn KeyValueStore>,
        store: ClientSessionStore,
        user_id: Uuid,
        onboarding: bool,
    ) -> Self {
        Self {
            profiles,
            storage,
            store,
            user_id,
            onboarding,
        }
    }

    /// Save the edit and return where to go next.
    pub async fn submit(&self, update: ProfileUpdate) -> Result<String> {
        let profile = self.profiles.update_profile(self.user_id, &update).await?;
        self.store.set_user(profile);

        if self.onboarding {
            let status =
                write_record(self.storage.as_ref(), self.user_id, OnboardingStatus::Completed)?;
            tracing::info!(user_id = %self.user_id, %status, "Onboarding finished");
            Ok(HOME_PATH.to_string())
        } else {
            Ok(format!("/profile/{}", self.user_id))
        }
    }

    /// Leave without saving.
    pub fn skip(&self) -> Result<String> {
        if self.onboarding {
            let status =
                write_record(self.storage.as_ref(), self.user_id, OnboardingStatus::Skipped)?;
            tracing::info!(user_id = %self.user_id, %status, "Onboarding skipped");
        }
        Ok(HOME_PATH.to_string())
    }
}
