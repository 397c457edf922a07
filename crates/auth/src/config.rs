use std::time::Duration;

use shadow_core::auth::{NewUserPolicy, RouteEnforcement, CALLBACK_PATH};
use url::Url;

use crate::error::AuthError;

/// Complete auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Public origin of this application, used to build provider redirects.
    pub base_url: Url,
    /// GoTrue-compatible identity provider. `None` runs the in-memory provider.
    pub provider_url: Option<Url>,
    pub provider_key: Option<String>,
    pub cookie_prefix: String,
    pub cookie_secure: bool,
    pub cookie_max_age: Duration,
    pub new_user_policy: NewUserPolicy,
    pub route_enforcement: RouteEnforcement,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://localhost:3000").expect("static URL is valid"),
            provider_url: None,
            provider_key: None,
            cookie_prefix: "sb".to_string(),
            cookie_secure: true,
            cookie_max_age: Duration::from_secs(7 * 24 * 60 * 60),
            new_user_policy: NewUserPolicy::default(),
            route_enforcement: RouteEnforcement::default(),
        }
    }
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AUTH_BASE_URL`: Public origin (default: `http://localhost:3000`)
    /// - `AUTH_PROVIDER_URL`: GoTrue endpoint, e.g. `https://<ref>.supabase.co/auth/v1`
    /// - `AUTH_PROVIDER_KEY`: API key sent as `apikey` (required with a provider URL)
    /// - `AUTH_COOKIE_PREFIX`: Session cookie prefix (default: `sb`)
    /// - `COOKIE_SECURE`: Whether to set secure flag on cookies (default: true)
    /// - `SESSION_TTL_DAYS`: Cookie lifetime in days (default: 7)
    /// - `NEW_USER_POLICY`: `account-age`, `always-home` or `provider-flag`
    /// - `NEW_USER_WINDOW_HOURS`: Window for `account-age` (default: 24)
    /// - `ROUTE_ENFORCEMENT`: `advisory` or `enforce` (default: `advisory`)
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` for unparsable values or a provider URL
    /// without a key.
    pub fn from_env() -> Result<Self, AuthError> {
        let defaults = Self::default();

        let base_url = match std::env::var("AUTH_BASE_URL") {
            Ok(raw) => parse_url("AUTH_BASE_URL", &raw)?,
            Err(_) => defaults.base_url,
        };

        let provider_url = std::env::var("AUTH_PROVIDER_URL")
            .ok()
            .map(|raw| parse_url("AUTH_PROVIDER_URL", &raw))
            .transpose()?;

        let provider_key = std::env::var("AUTH_PROVIDER_KEY").ok();
        if provider_url.is_some() && provider_key.is_none() {
            return Err(AuthError::Config(
                "AUTH_PROVIDER_KEY is required when AUTH_PROVIDER_URL is set".to_string(),
            ));
        }

        let cookie_prefix =
            std::env::var("AUTH_COOKIE_PREFIX").unwrap_or(defaults.cookie_prefix);

        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(defaults.cookie_secure);

        let cookie_max_age = match std::env::var("SESSION_TTL_DAYS") {
            Ok(raw) => parse_session_ttl_days(&raw)?,
            Err(_) => defaults.cookie_max_age,
        };

        let mut new_user_policy = match std::env::var("NEW_USER_POLICY") {
            Ok(raw) => raw.parse().map_err(AuthError::Config)?,
            Err(_) => defaults.new_user_policy,
        };
        if let (NewUserPolicy::AccountAge { .. }, Ok(raw)) =
            (new_user_policy, std::env::var("NEW_USER_WINDOW_HOURS"))
        {
            new_user_policy = parse_window_hours(&raw)?;
        }

        let route_enforcement = match std::env::var("ROUTE_ENFORCEMENT") {
            Ok(raw) => raw.parse().map_err(AuthError::Config)?,
            Err(_) => defaults.route_enforcement,
        };

        Ok(Self {
            base_url,
            provider_url,
            provider_key,
            cookie_prefix,
            cookie_secure,
            cookie_max_age,
            new_user_policy,
            route_enforcement,
        })
    }

    pub fn access_cookie(&self) -> String {
        format!("{}-access-token", self.cookie_prefix)
    }

    pub fn refresh_cookie(&self) -> String {
        format!("{}-refresh-token", self.cookie_prefix)
    }

    /// Cookie holding the PKCE verifier of a login in progress.
    pub fn verifier_cookie(&self) -> String {
        format!("{}-code-verifier", self.cookie_prefix)
    }

    /// Where recovery email links send the user back to.
    pub fn recovery_redirect(&self) -> Result<Url, AuthError> {
        let mut url = self
            .base_url
            .join(CALLBACK_PATH)
            .map_err(|e| AuthError::Config(e.to_string()))?;
        url.query_pairs_mut().append_pair("type", "recovery");
        Ok(url)
    }
}

fn parse_url(name: &str, raw: &str) -> Result<Url, AuthError> {
    raw.parse()
        .map_err(|e| AuthError::Config(format!("{} must be a valid URL: {}", name, e)))
}

fn parse_session_ttl_days(raw: &str) -> Result<Duration, AuthError> {
    let days = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| AuthError::Config(format!("SESSION_TTL_DAYS is not a number: {}", e)))?;
    days.checked_mul(24 * 60 * 60)
        .filter(|secs| i64::try_from(*secs).is_ok())
        .map(Duration::from_secs)
        .ok_or_else(|| AuthError::Config(format!("SESSION_TTL_DAYS is out of range: {}", days)))
}

fn parse_window_hours(raw: &str) -> Result<NewUserPolicy, AuthError> {
    let hours = raw.trim().parse::<i64>().map_err(|e| {
        AuthError::Config(format!("NEW_USER_WINDOW_HOURS is not a number: {}", e))
    })?;
    let window = chrono::TimeDelta::try_hours(hours)
        .filter(|_| hours >= 0)
        .ok_or_else(|| {
            AuthError::Config(format!("NEW_USER_WINDOW_HOURS is out of range: {}", hours))
        })?;
    Ok(NewUserPolicy::AccountAge { window })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_names_use_prefix() {
        let config = AuthConfig {
            cookie_prefix: "shadow".to_string(),
            ..Default::default()
        };
        assert_eq!(config.access_cookie(), "shadow-access-token");
        assert_eq!(config.refresh_cookie(), "shadow-refresh-token");
        assert_eq!(config.verifier_cookie(), "shadow-code-verifier");
    }

    #[test]
    fn recovery_redirect_points_at_callback() {
        let config = AuthConfig {
            base_url: Url::parse("https://shadow.example.com").unwrap(),
            ..Default::default()
        };
        assert_eq!(
            config.recovery_redirect().unwrap().as_str(),
            "https://shadow.example.com/auth/callback?type=recovery"
        );
    }

    #[test]
    fn session_ttl_days_rejects_overflow() {
        assert_eq!(
            parse_session_ttl_days("7").unwrap(),
            Duration::from_secs(7 * 24 * 60 * 60)
        );
        assert!(matches!(
            parse_session_ttl_days(&u64::MAX.to_string()),
            Err(AuthError::Config(_))
        ));
        assert!(matches!(
            parse_session_ttl_days("106751991167301"),
            Err(AuthError::Config(_))
        ));
        assert!(matches!(parse_session_ttl_days("week"), Err(AuthError::Config(_))));
    }

    #[test]
    fn window_hours_rejects_negative_and_out_of_range() {
        assert_eq!(
            parse_window_hours("48").unwrap(),
            NewUserPolicy::account_age_hours(48)
        );
        for raw in ["-1", &i64::MAX.to_string(), "soon"] {
            assert!(
                matches!(parse_window_hours(raw), Err(AuthError::Config(_))),
                "{}",
                raw
            );
        }
    }

    #[test]
    fn defaults_are_advisory_with_account_age() {
        let config = AuthConfig::default();
        assert_eq!(config.route_enforcement, RouteEnforcement::Advisory);
        assert_eq!(config.new_user_policy, NewUserPolicy::default());
        assert!(config.provider_url.is_none());
    }
}
