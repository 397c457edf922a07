//! Path classification for the session refresher.

use std::str::FromStr;

pub const HOME_PATH: &str = "/";
pub const SIGN_IN_PATH: &str = "/sign-in";
pub const FORGOT_PASSWORD_PATH: &str = "/forgot-password";
pub const UPDATE_PASSWORD_PATH: &str = "/update-password";
pub const UPDATE_PROFILE_PATH: &str = "/update-profile";
pub const CALLBACK_PATH: &str = "/auth/callback";
pub const ERROR_PATH: &str = "/auth/auth-code-error";

/// Paths reachable without a session. Matched exactly or as `prefix + "/"`.
pub const PUBLIC_ROUTES: &[&str] = &[
    "/",
    "/sign-in",
    "/sign-up",
    "/forgot-password",
    "/reset-password",
    "/update-password",
    "/auth/callback",
    "/auth/auth-code-error",
    "/auth/forgot-password",
    "/posts",
    "/profile",
    "/shared-profile",
];

/// Prefixes the refresher never touches.
const EXCLUDED_PREFIXES: &[&str] = &["/_next/", "/assets/", "/api/"];

/// True for static assets and API calls: no provider call, no cookie writes.
pub fn is_excluded_path(path: &str) -> bool {
    EXCLUDED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
        || path.ends_with("favicon.ico")
        || path.contains('.')
}

pub fn is_public_route(path: &str) -> bool {
    PUBLIC_ROUTES.iter().any(|route| {
        path == *route
            || path
                .strip_prefix(route)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Protected,
}

pub fn classify_route(path: &str) -> RouteClass {
    if is_public_route(path) {
        RouteClass::Public
    } else {
        RouteClass::Protected
    }
}

/// Whether the refresher acts on the route classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteEnforcement {
    /// Classification is computed and logged; every request proceeds.
    #[default]
    Advisory,
    /// Protected routes without a session are sent to sign-in.
    Enforce,
}

impl FromStr for RouteEnforcement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advisory" => Ok(Self::Advisory),
            "enforce" => Ok(Self::Enforce),
            other => Err(format!("unknown route enforcement '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Proceed,
    RedirectToSignIn,
}

pub fn route_decision(
    enforcement: RouteEnforcement,
    class: RouteClass,
    authenticated: bool,
) -> RouteDecision {
    match (enforcement, class, authenticated) {
        (RouteEnforcement::Enforce, RouteClass::Protected, false) => RouteDecision::RedirectToSignIn,
        _ => RouteDecision::Proceed,
    }
}
