use thiserror::Error;

use crate::TokenError;

/// Authentication failure.
///
/// Every variant except [`AuthError::Store`] is reported to the client the
/// same way (400, empty body), so callers cannot tell an unknown email from a
/// wrong password or a tampered token from an expired one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no credential presented")]
    MissingCredential,

    #[error("malformed credential: {0}")]
    Malformed(&'static str),

    #[error("invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    #[error("unknown session")]
    UnknownSession,

    /// The credential store could not be consulted.
    #[error("credential store unavailable: {0}")]
    Store(String),
}

impl AuthError {
    /// Whether this is a rejection of the caller (as opposed to an internal failure).
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}
