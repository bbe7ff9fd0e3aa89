//! Per-scheme request authentication.
//!
//! A resolver looks at the request headers for the one kind of credential it
//! understands. It answers `Ok(None)` when that credential is simply absent,
//! so the gate can try the next scheme, and `Err(_)` when a credential is
//! present but bad.

use std::sync::Arc;

use axum::http::{HeaderMap, header};
use chrono::Utc;

use subway_auth::{AuthError, AuthScheme, Principal, SESSION_COOKIE, SessionId, SessionStore, TokenValidator};

pub trait PrincipalResolver: Send + Sync {
    fn scheme(&self) -> AuthScheme;

    fn resolve(&self, headers: &HeaderMap) -> Result<Option<Principal>, AuthError>;
}

/// `Authorization: Bearer <token>`.
pub struct TokenResolver {
    validator: Arc<dyn TokenValidator>,
}

impl TokenResolver {
    pub fn new(validator: Arc<dyn TokenValidator>) -> Self {
        Self { validator }
    }
}

impl PrincipalResolver for TokenResolver {
    fn scheme(&self) -> AuthScheme {
        AuthScheme::Token
    }

    fn resolve(&self, headers: &HeaderMap) -> Result<Option<Principal>, AuthError> {
        let Some(token) = extract_bearer(headers)? else {
            return Ok(None);
        };
        let claims = self.validator.validate(token, Utc::now())?;
        Ok(Some(claims.principal()))
    }
}

/// `Cookie: SESSION=<id>`, issued by the form login.
pub struct SessionResolver {
    sessions: Arc<dyn SessionStore>,
}

impl SessionResolver {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }
}

impl PrincipalResolver for SessionResolver {
    fn scheme(&self) -> AuthScheme {
        AuthScheme::Session
    }

    fn resolve(&self, headers: &HeaderMap) -> Result<Option<Principal>, AuthError> {
        let Some(raw) = session_cookie(headers) else {
            return Ok(None);
        };
        let id: SessionId = raw.parse().map_err(|_| AuthError::UnknownSession)?;
        self.sessions
            .get(&id)
            .map(Some)
            .ok_or(AuthError::UnknownSession)
    }
}

/// Build the resolvers for the enabled schemes, keeping their order.
pub fn resolvers_for(
    schemes: &[AuthScheme],
    tokens: Arc<dyn TokenValidator>,
    sessions: Arc<dyn SessionStore>,
) -> Vec<Arc<dyn PrincipalResolver>> {
    schemes
        .iter()
        .map(|scheme| -> Arc<dyn PrincipalResolver> {
            match scheme {
                AuthScheme::Token => Arc::new(TokenResolver::new(tokens.clone())),
                AuthScheme::Session => Arc::new(SessionResolver::new(sessions.clone())),
            }
        })
        .collect()
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let header = header
        .to_str()
        .map_err(|_| AuthError::Malformed("authorization header is not ASCII"))?;

    let Some((scheme, token)) = header.split_once(' ') else {
        return Ok(None);
    };
    if !scheme.eq_ignore_ascii_case("bearer") {
        // Some other scheme (Basic, ...); not ours.
        return Ok(None);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::Malformed("empty bearer token"));
    }
    Ok(Some(token))
}

fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
}
