//! Application state for auth.

use std::sync::Arc;

use shadow_core::auth::IdentityProvider;
use shadow_core::profile::ProfileRepository;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::providers::GoTrueProvider;

/// Shared state for auth handlers and the session refresher.
#[derive(Clone)]
pub struct AuthState {
    pub provider: Arc<dyn IdentityProvider>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub config: AuthConfig,
}

impl AuthState {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileRepository>,
        config: AuthConfig,
    ) -> Self {
        Self {
            provider,
            profiles,
            config,
        }
    }

    /// Creates an AuthState talking to the configured GoTrue provider.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if no provider URL/key is configured.
    pub fn with_gotrue(
        profiles: Arc<dyn ProfileRepository>,
        config: AuthConfig,
    ) -> Result<Self, AuthError> {
        let (Some(url), Some(key)) = (config.provider_url.clone(), config.provider_key.clone())
        else {
            return Err(AuthError::Config(
                "AUTH_PROVIDER_URL and AUTH_PROVIDER_KEY are required".to_string(),
            ));
        };

        let provider = Arc::new(GoTrueProvider::new(url, key));
        Ok(Self::new(provider, profiles, config))
    }
}
