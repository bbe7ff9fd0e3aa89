//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the services handlers call into
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: mapping service errors to responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use subway_auth::AuthScheme;
use subway_infra::AppConfig;

use crate::middleware;
use crate::resolver::resolvers_for;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = AppServices::from_config(config).await?;
    Ok(build_router(Arc::new(services), &config.auth_schemes))
}

/// Router over already-built services, guarded by the given schemes in order.
pub fn build_router(services: Arc<AppServices>, schemes: &[AuthScheme]) -> Router {
    let auth_state = middleware::AuthState::new(resolvers_for(
        schemes,
        services.tokens.clone(),
        services.sessions.clone(),
    ));

    // Protected routes: require an authenticated member.
    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    routes::public_router()
        .merge(protected)
        .layer(Extension(services))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
