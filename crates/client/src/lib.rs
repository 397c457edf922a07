//! shadow_client - client-side session state and first-run onboarding.

pub mod completion;
pub mod config;
pub mod error;
pub mod gate;
pub mod source;
pub mod storage;
pub mod store;

pub use completion::ProfileCompletion;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use gate::{Navigator, OnboardingGate};
pub use source::{HttpSessionSource, SessionSource};
pub use storage::{FileStorage, MemoryStorage};
pub use store::{ClientSessionStore, SessionEvent, SessionSnapshot};
