use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::Extension,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::post,
};

use subway_auth::{Credentials, SESSION_COOKIE};

use crate::app::dto;
use crate::app::services::AppServices;
use crate::middleware::authentication_failure;

pub fn router() -> Router {
    Router::new()
        .route("/token", post(login_token))
        .route("/session", post(login_session))
}

pub async fn login_token(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::TokenRequest>,
) -> axum::response::Response {
    let credentials = Credentials::from(body);
    match services.login.issue_token(&credentials).await {
        Ok(token) => (
            StatusCode::OK,
            Json(dto::TokenResponse {
                access_token: token.into_string(),
            }),
        )
            .into_response(),
        Err(e) => authentication_failure(&e),
    }
}

pub async fn login_session(
    Extension(services): Extension<Arc<AppServices>>,
    Form(form): Form<dto::SessionLoginForm>,
) -> axum::response::Response {
    let credentials = Credentials::from(form);
    let principal = match services.login.authenticate(&credentials).await {
        Ok(p) => p,
        Err(e) => return authentication_failure(&e),
    };

    let member_id = principal.id();
    let session = match services.open_session(principal) {
        Ok(id) => id,
        Err(e) => return authentication_failure(&e),
    };
    tracing::info!(member_id = %member_id, "session opened");

    (
        StatusCode::OK,
        [(header::SET_COOKIE, format!("{SESSION_COOKIE}={session}; HttpOnly; Path=/"))],
    )
        .into_response()
}
