//! Application handlers outside the auth routes.

use axum::{http::StatusCode, Json};
use serde::Serialize;
use shadow_auth::OptionalSession;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub authenticated: bool,
    pub user_id: Option<Uuid>,
}

/// GET /livez - Basic liveness probe.
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET / - Reports who the request is signed in as.
pub async fn home(OptionalSession(user): OptionalSession) -> Json<HomeResponse> {
    Json(HomeResponse {
        authenticated: user.is_some(),
        user_id: user.map(|u| u.id),
    })
}
