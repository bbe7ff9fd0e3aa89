use axum::{Router, routing::get};

pub mod login;
pub mod members;
pub mod stations;
pub mod system;

/// Endpoints open to anonymous callers.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .nest("/login", login::router())
        .merge(members::public_router())
}

/// Endpoints that act on behalf of the logged-in member.
pub fn protected_router() -> Router {
    Router::new()
        .merge(members::me_router())
        .nest("/stations", stations::router())
}
