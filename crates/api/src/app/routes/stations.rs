use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};

use subway_core::StationId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::LoginMember;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_station).get(list_stations))
        .route("/:id", get(get_station).put(update_station).delete(delete_station))
}

pub async fn create_station(
    Extension(services): Extension<Arc<AppServices>>,
    LoginMember(principal): LoginMember,
    Json(body): Json<dto::StationRequest>,
) -> axum::response::Response {
    match services.stations.create(&principal, &body.name).await {
        Ok(station) => (
            StatusCode::CREATED,
            [(header::LOCATION, format!("/stations/{}", station.id_typed()))],
            Json(dto::StationResponse::from(&station)),
        )
            .into_response(),
        Err(e) => errors::station_error_to_response(e),
    }
}

pub async fn list_stations(
    Extension(services): Extension<Arc<AppServices>>,
    LoginMember(principal): LoginMember,
) -> axum::response::Response {
    match services.stations.list_owned(&principal).await {
        Ok(stations) => {
            let items = stations.iter().map(dto::StationResponse::from).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::station_error_to_response(e),
    }
}

pub async fn get_station(
    Extension(services): Extension<Arc<AppServices>>,
    LoginMember(principal): LoginMember,
    Path(id): Path<String>,
) -> axum::response::Response {
    // An id that cannot exist is reported like any other unknown station.
    let Ok(id) = id.parse::<StationId>() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match services.stations.find_owned(&principal, id).await {
        Ok(station) => (StatusCode::OK, Json(dto::StationResponse::from(&station))).into_response(),
        Err(e) => errors::station_error_to_response(e),
    }
}

pub async fn update_station(
    Extension(services): Extension<Arc<AppServices>>,
    LoginMember(principal): LoginMember,
    Path(id): Path<String>,
    Json(body): Json<dto::StationRequest>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<StationId>() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match services.stations.update(&principal, id, &body.name).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => errors::station_error_to_response(e),
    }
}

pub async fn delete_station(
    Extension(services): Extension<Arc<AppServices>>,
    LoginMember(principal): LoginMember,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<StationId>() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match services.stations.delete(&principal, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::station_error_to_response(e),
    }
}
