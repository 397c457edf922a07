//! Session cookie contract.
//!
//! These helpers are the only code that knows how session tokens map onto
//! cookies. The refresher and the callback write through them; extractors
//! read through them.

use axum::http::{header::SET_COOKIE, HeaderMap};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use shadow_core::auth::SessionTokens;

use crate::config::AuthConfig;

/// Read the token pair. Both cookies must be present and non-empty.
pub fn read_tokens(jar: &CookieJar, config: &AuthConfig) -> Option<SessionTokens> {
    let access_token = jar.get(&config.access_cookie())?.value().to_string();
    let refresh_token = jar.get(&config.refresh_cookie())?.value().to_string();
    if access_token.is_empty() || refresh_token.is_empty() {
        return None;
    }
    Some(SessionTokens {
        access_token,
        refresh_token,
    })
}

/// Replace the session cookies with `tokens`.
pub fn write_tokens(jar: CookieJar, config: &AuthConfig, tokens: &SessionTokens) -> CookieJar {
    jar.add(session_cookie(
        config,
        config.access_cookie(),
        tokens.access_token.clone(),
    ))
    .add(session_cookie(
        config,
        config.refresh_cookie(),
        tokens.refresh_token.clone(),
    ))
}

pub fn clear_tokens(jar: CookieJar, config: &AuthConfig) -> CookieJar {
    jar.remove(removal(config.access_cookie()))
        .remove(removal(config.refresh_cookie()))
}

/// Take the PKCE verifier, removing its cookie: it is only good for one
/// exchange.
pub fn take_verifier(jar: CookieJar, config: &AuthConfig) -> (CookieJar, Option<String>) {
    let name = config.verifier_cookie();
    match jar.get(&name).map(|c| c.value().to_string()) {
        Some(verifier) if !verifier.is_empty() => (jar.remove(removal(name)), Some(verifier)),
        _ => (jar, None),
    }
}

/// True when a response already sets the session cookies.
pub fn response_sets_session(headers: &HeaderMap, config: &AuthConfig) -> bool {
    let names = [config.access_cookie(), config.refresh_cookie()];
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| Cookie::parse(value).ok())
        .any(|cookie| names.iter().any(|name| name == cookie.name()))
}

fn session_cookie(config: &AuthConfig, name: String, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(
            i64::try_from(config.cookie_max_age.as_secs()).unwrap_or(i64::MAX),
        ))
        .build()
}

fn removal(name: String) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}
