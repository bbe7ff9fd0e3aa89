//! `subway-auth` — authentication boundary.
//!
//! Credentials, principals, bearer tokens, password hashing and the session
//! store contract. This crate is intentionally decoupled from HTTP and from
//! any concrete storage.

pub mod claims;
pub mod credentials;
pub mod error;
pub mod password;
pub mod principal;
pub mod scheme;
pub mod session;
pub mod token;

pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use credentials::Credentials;
pub use error::AuthError;
pub use password::{Argon2Hasher, CredentialHasher, PasswordError, hash_password, verify_password};
pub use principal::Principal;
pub use scheme::AuthScheme;
pub use session::{SESSION_COOKIE, SessionId, SessionStore};
pub use token::{AccessToken, Hs256Jwt, TokenError, TokenIssuer, TokenValidator};
