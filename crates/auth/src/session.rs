//! Server-side session contract for the form/session login variant.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use subway_core::MemberId;

use crate::{AuthError, Principal};

/// Cookie name carrying the session id.
pub const SESSION_COOKIE: &str = "SESSION";

/// Random, unguessable session identifier.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh id (UUIDv4, random).
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::fmt::Debug for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SessionId(<redacted>)")
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Session persistence.
///
/// Sessions expire; an expired id resolves to nothing, like an unknown one.
pub trait SessionStore: Send + Sync {
    /// Start a session for `principal` and return its id.
    fn create(&self, principal: Principal) -> Result<SessionId, AuthError>;
    fn get(&self, id: &SessionId) -> Option<Principal>;
    /// End every session of `member`. Returns how many were dropped.
    fn remove_all_for(&self, member: MemberId) -> usize;
}

impl<S> SessionStore for std::sync::Arc<S>
where
    S: SessionStore + ?Sized,
{
    fn create(&self, principal: Principal) -> Result<SessionId, AuthError> {
        (**self).create(principal)
    }

    fn get(&self, id: &SessionId) -> Option<Principal> {
        (**self).get(id)
    }

    fn remove_all_for(&self, member: MemberId) -> usize {
        (**self).remove_all_for(member)
    }
}
