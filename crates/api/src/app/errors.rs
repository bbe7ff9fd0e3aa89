use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use subway_members::MemberError;
use subway_stations::StationError;

/// Business-rule failures carry a plain-text message; the client shows it as-is.
fn rejected(message: String) -> axum::response::Response {
    (StatusCode::BAD_REQUEST, message).into_response()
}

pub fn station_error_to_response(err: StationError) -> axum::response::Response {
    match err {
        StationError::Validation(_) | StationError::DuplicateName(_) => rejected(err.to_string()),
        StationError::NotFound => StatusCode::NOT_FOUND.into_response(),
        StationError::Store(msg) => {
            tracing::error!(error = %msg, "station store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn member_error_to_response(err: MemberError) -> axum::response::Response {
    match err {
        MemberError::Validation(_) | MemberError::DuplicateEmail(_) => rejected(err.to_string()),
        MemberError::NotFound => StatusCode::NOT_FOUND.into_response(),
        MemberError::Hashing(msg) => {
            tracing::error!(error = %msg, "password hashing failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "hashing_error", msg)
        }
        MemberError::Store(msg) => {
            tracing::error!(error = %msg, "member store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
