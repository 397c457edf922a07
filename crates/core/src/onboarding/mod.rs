//! First-run onboarding: the durable per-user record and the gate that
//! decides whether a freshly authenticated user must complete their profile.

mod decision;
mod latch;
mod storage;
mod types;

pub use decision::{decide, is_completion_route, is_profile_incomplete};
pub use latch::{GateLatch, GatePhase};
pub use storage::{read_record, record_key, write_record, KeyValueStore, StorageError};
pub use types::{GateDecision, NavigationDecision, OnboardingStatus};
