use thiserror::Error;
use uuid::Uuid;

use super::OnboardingStatus;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Durable client-side key/value storage.
///
/// Reads and writes are synchronous: they run inside a single client effect
/// and never interleave with an await.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// `onboarding_{userId}`
pub fn record_key(user_id: Uuid) -> String {
    format!("onboarding_{}", user_id)
}

pub fn read_record(
    store: &dyn KeyValueStore,
    user_id: Uuid,
) -> Result<Option<OnboardingStatus>, StorageError> {
    Ok(store
        .get(&record_key(user_id))?
        .as_deref()
        .and_then(OnboardingStatus::parse))
}

/// Record a terminal status. An existing status is never replaced; the
/// status actually on record is returned.
pub fn write_record(
    store: &dyn KeyValueStore,
    user_id: Uuid,
    status: OnboardingStatus,
) -> Result<OnboardingStatus, StorageError> {
    if let Some(existing) = read_record(store, user_id)? {
        return Ok(existing);
    }
    store.set(&record_key(user_id), status.as_str())?;
    Ok(status)
}
