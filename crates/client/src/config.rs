//! Client configuration.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use shadow_core::onboarding::KeyValueStore;

use crate::source::HttpSessionSource;
use crate::storage::{FileStorage, MemoryStorage};

#[derive(Debug, Clone, Args)]
pub struct ClientConfig {
    /// Server base URL.
    #[arg(long, env = "SHADOW_URL", default_value = "http://localhost:3000")]
    pub base_url: String,

    /// File holding durable client state. In-memory when unset.
    #[arg(long, env = "SHADOW_STORAGE_PATH")]
    pub storage_path: Option<PathBuf>,

    /// Session cookie name prefix.
    #[arg(long, env = "AUTH_COOKIE_PREFIX", default_value = "sb")]
    pub cookie_prefix: String,

    /// Access token to present as the session cookie.
    #[arg(long, env = "SHADOW_ACCESS_TOKEN")]
    pub access_token: Option<String>,

    /// Refresh token to present as the session cookie.
    #[arg(long, env = "SHADOW_REFRESH_TOKEN")]
    pub refresh_token: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            storage_path: None,
            cookie_prefix: "sb".to_string(),
            access_token: None,
            refresh_token: None,
        }
    }

    pub fn storage(&self) -> Arc<dyn KeyValueStore> {
        match &self.storage_path {
            Some(path) => Arc::new(FileStorage::new(path)),
            None => Arc::new(MemoryStorage::new()),
        }
    }

    pub fn session_source(&self) -> HttpSessionSource {
        let source = HttpSessionSource::new(&self.base_url);
        match (&self.access_token, &self.refresh_token) {
            (Some(access), Some(refresh)) => source.with_tokens(&self.cookie_prefix, access, refresh),
            _ => source,
        }
    }
}
