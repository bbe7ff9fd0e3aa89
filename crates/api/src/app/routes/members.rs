use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};

use subway_core::MemberId;
use subway_members::MemberInput;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::LoginMember;

/// Sign-up and id-addressed member management.
pub fn public_router() -> Router {
    Router::new()
        .route("/members", post(create_member))
        .route("/members/:id", get(get_member).put(update_member).delete(delete_member))
}

/// The logged-in member's own record.
pub fn me_router() -> Router {
    Router::new().route("/members/me", get(get_me).put(update_me).delete(delete_me))
}

pub async fn create_member(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::MemberRequest>,
) -> axum::response::Response {
    let input = MemberInput::from(body);
    match services.members.register(&input).await {
        Ok(member) => (
            StatusCode::CREATED,
            [(header::LOCATION, format!("/members/{}", member.id_typed()))],
            Json(dto::MemberResponse::from(&member)),
        )
            .into_response(),
        Err(e) => errors::member_error_to_response(e),
    }
}

pub async fn get_member(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<MemberId>() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    show(&services, id).await
}

pub async fn update_member(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::MemberRequest>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<MemberId>() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    update(&services, id, body).await
}

pub async fn delete_member(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<MemberId>() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    withdraw(&services, id).await
}

pub async fn get_me(
    Extension(services): Extension<Arc<AppServices>>,
    LoginMember(principal): LoginMember,
) -> axum::response::Response {
    show(&services, principal.id()).await
}

pub async fn update_me(
    Extension(services): Extension<Arc<AppServices>>,
    LoginMember(principal): LoginMember,
    Json(body): Json<dto::MemberRequest>,
) -> axum::response::Response {
    update(&services, principal.id(), body).await
}

pub async fn delete_me(
    Extension(services): Extension<Arc<AppServices>>,
    LoginMember(principal): LoginMember,
) -> axum::response::Response {
    withdraw(&services, principal.id()).await
}

async fn show(services: &AppServices, id: MemberId) -> axum::response::Response {
    match services.members.find(id).await {
        Ok(member) => (StatusCode::OK, Json(dto::MemberResponse::from(&member))).into_response(),
        Err(e) => errors::member_error_to_response(e),
    }
}

async fn update(services: &AppServices, id: MemberId, body: dto::MemberRequest) -> axum::response::Response {
    let input = MemberInput::from(body);
    match services.members.update(id, &input).await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(e) => errors::member_error_to_response(e),
    }
}

async fn withdraw(services: &AppServices, id: MemberId) -> axum::response::Response {
    match services.withdraw_member(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::member_error_to_response(e),
    }
}
