//! Authentication for Shadow.
//!
//! This crate provides:
//! - Per-request session refresh middleware with cookie rotation
//! - The code exchange callback and recovery endpoints
//! - Identity providers (GoTrue over HTTP, in-memory for development)
//! - Axum extractors for the current session

mod config;
mod cookies;
mod error;
mod extractors;
mod handlers;
mod profiles;
mod providers;
mod refresher;
mod session;
mod state;

pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::{CurrentSession, OptionalSession};
pub use handlers::auth_routes;
pub use profiles::MemoryProfileStore;
pub use providers::{GoTrueProvider, MemoryProvider, RecoveryEmail};
pub use refresher::refresh_session;
pub use session::RequestSession;
pub use state::AuthState;

pub mod mock_idp;
