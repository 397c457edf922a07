use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's public profile as stored by the profile store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub bio: Option<String>,
    /// Reference to the avatar produced by the media pipeline.
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn new(id: Uuid, email: impl Into<String>, name: impl Into<String>) -> Self {
        let email = email.into();
        let username = email.split('@').next().unwrap_or_default().to_string();
        Self {
            id,
            email,
            name: name.into(),
            username,
            bio: None,
            avatar_url: None,
            created_at: Utc::now(),
            email_confirmed_at: None,
        }
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub fn with_avatar(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }

    pub fn has_bio(&self) -> bool {
        is_filled(&self.bio)
    }

    pub fn has_avatar(&self) -> bool {
        is_filled(&self.avatar_url)
    }

    /// Copy the editable fields of `update` onto this profile.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        self.name = update.name.clone();
        self.bio = update.bio.clone();
        if let Some(avatar_url) = &update.avatar_url {
            self.avatar_url = Some(avatar_url.clone());
        }
    }
}

fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Fields the profile-completion form can change. A `None` avatar keeps the
/// current one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}
