//! Identity provider implementations.
//!
//! This module contains implementations of `IdentityProvider` for:
//! - GoTrue-compatible REST APIs (Supabase Auth)
//! - An in-memory provider for development and tests

mod gotrue;
mod memory;

pub use gotrue::GoTrueProvider;
pub use memory::{MemoryProvider, RecoveryEmail};
