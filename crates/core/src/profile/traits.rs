use async_trait::async_trait;
use uuid::Uuid;

use super::{ProfileUpdate, Result, UserProfile};

/// The external profile store, limited to what the auth flows touch.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Gets a profile by user ID.
    async fn get_profile(&self, id: Uuid) -> Result<Option<UserProfile>>;

    /// Gets a profile by (normalized) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>>;

    /// Applies an edit and returns the stored profile.
    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<UserProfile>;
}
