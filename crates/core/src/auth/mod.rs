mod callback;
mod error;
mod functions;
mod routes;
mod traits;
mod types;

pub use callback::{
    classify_callback, failure_destination, onboarding_path, post_login_destination,
    CallbackParams, CallbackStep, Destination, NewUserPolicy,
};
pub use error::{AuthError, GENERIC_AUTH_FAILURE, INVALID_LINK_MESSAGE};
pub use functions::{calculate_expiry, generate_token, normalize_email};
pub use routes::{
    classify_route, is_excluded_path, is_public_route, route_decision, RouteClass,
    RouteDecision, RouteEnforcement, CALLBACK_PATH, ERROR_PATH, FORGOT_PASSWORD_PATH, HOME_PATH,
    PUBLIC_ROUTES, SIGN_IN_PATH, UPDATE_PASSWORD_PATH, UPDATE_PROFILE_PATH,
};
pub use traits::{IdentityProvider, Result};
pub use types::{
    AuthUser, ExchangeCode, FlowType, RefreshOutcome, Session, SessionState, SessionTokens,
};
