//! Functional core for Shadow authentication, sessions and onboarding.
//!
//! Everything in this crate is free of I/O: types, error enums, the traits
//! implemented by the imperative shell, and the pure decision functions that
//! choose where a request or a client should go next.

pub mod auth;
pub mod onboarding;
pub mod profile;
