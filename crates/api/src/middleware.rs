use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use subway_auth::{AuthError, Principal};

use crate::resolver::PrincipalResolver;

/// State of the authentication gate: the enabled resolvers, in the order they
/// are tried.
#[derive(Clone)]
pub struct AuthState {
    resolvers: Arc<[Arc<dyn PrincipalResolver>]>,
}

impl AuthState {
    pub fn new(resolvers: Vec<Arc<dyn PrincipalResolver>>) -> Self {
        Self {
            resolvers: resolvers.into(),
        }
    }

    /// The first scheme that recognises a credential decides the outcome.
    pub fn resolve(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        for resolver in self.resolvers.iter() {
            match resolver.resolve(headers) {
                Ok(Some(principal)) => return Ok(principal),
                Ok(None) => continue,
                Err(err) => {
                    tracing::debug!(scheme = %resolver.scheme(), error = %err, "credential rejected");
                    return Err(err);
                }
            }
        }
        Err(AuthError::MissingCredential)
    }
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    match state.resolve(req.headers()) {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(err) => authentication_failure(&err),
    }
}

/// Rejected requests get 400 with an empty body, whatever the reason.
pub fn authentication_failure(err: &AuthError) -> Response {
    if err.is_rejection() {
        tracing::debug!(error = %err, "authentication failed");
        StatusCode::BAD_REQUEST.into_response()
    } else {
        tracing::error!(error = %err, "authentication could not be completed");
        crate::app::errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "auth_unavailable", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};
    use subway_auth::{AuthScheme, Hs256Jwt, SessionStore};
    use subway_core::MemberId;
    use subway_infra::InMemorySessionStore;

    use crate::resolver::resolvers_for;

    fn state(schemes: &[AuthScheme]) -> (AuthState, Arc<InMemorySessionStore>) {
        let jwt = Arc::new(Hs256Jwt::new(b"secret", chrono::Duration::minutes(5)));
        let sessions = Arc::new(InMemorySessionStore::default());
        (AuthState::new(resolvers_for(schemes, jwt, sessions.clone())), sessions)
    }

    #[test]
    fn no_credential_is_a_rejection() {
        let (state, _) = state(&[AuthScheme::Token, AuthScheme::Session]);
        assert_eq!(state.resolve(&HeaderMap::new()), Err(AuthError::MissingCredential));
    }

    #[test]
    fn later_scheme_is_used_when_earlier_finds_nothing() {
        let (state, sessions) = state(&[AuthScheme::Token, AuthScheme::Session]);
        let principal = Principal::new(MemberId::from_raw(1), "a@email.com");
        let id = sessions.create(principal.clone()).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(&format!("SESSION={id}")).unwrap());
        assert_eq!(state.resolve(&headers), Ok(principal));
    }

    #[test]
    fn bad_credential_stops_resolution() {
        let (state, sessions) = state(&[AuthScheme::Token, AuthScheme::Session]);
        let id = sessions.create(Principal::new(MemberId::from_raw(1), "a@email.com")).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer forged"));
        headers.insert(header::COOKIE, HeaderValue::from_str(&format!("SESSION={id}")).unwrap());
        assert!(matches!(state.resolve(&headers), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn disabled_scheme_is_ignored() {
        let (state, sessions) = state(&[AuthScheme::Token]);
        let id = sessions.create(Principal::new(MemberId::from_raw(1), "a@email.com")).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(&format!("SESSION={id}")).unwrap());
        assert_eq!(state.resolve(&headers), Err(AuthError::MissingCredential));
    }

    #[test]
    fn failure_response_is_bare_400() {
        let res = authentication_failure(&AuthError::MissingCredential);
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let res = authentication_failure(&AuthError::Store("down".to_string()));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
