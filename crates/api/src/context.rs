use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;

use subway_auth::Principal;

/// The authenticated member of the current request.
///
/// Inserted into the request extensions by the auth middleware; handlers take
/// it as an ordinary parameter. On a route the middleware does not guard the
/// extractor fails the same way the middleware would (400, empty body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginMember(pub Principal);

impl LoginMember {
    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for LoginMember
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(LoginMember)
            .ok_or(StatusCode::BAD_REQUEST)
    }
}
