use std::sync::Arc;

use chrono::Utc;

use subway_auth::{AccessToken, AuthError, Credentials, Principal, TokenIssuer};

use crate::{MemberRepository, MemberService};

/// Token issuer front: credentials in, bearer token out.
#[derive(Clone)]
pub struct LoginService<R> {
    members: MemberService<R>,
    issuer: Arc<dyn TokenIssuer>,
}

impl<R: MemberRepository> LoginService<R> {
    pub fn new(members: MemberService<R>, issuer: Arc<dyn TokenIssuer>) -> Self {
        Self { members, issuer }
    }

    /// Verify `credentials` and mint a token bound to the member's id.
    pub async fn issue_token(&self, credentials: &Credentials) -> Result<AccessToken, AuthError> {
        let principal = self.members.authenticate(credentials).await?;
        let token = self.issuer.issue(&principal, Utc::now())?;
        tracing::debug!(member_id = %principal.id(), "access token issued");
        Ok(token)
    }

    /// Verify `credentials` without minting a token (session login).
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Principal, AuthError> {
        self.members.authenticate(credentials).await
    }
}
