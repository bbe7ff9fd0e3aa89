use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use subway_auth::{Argon2Hasher, AuthError, CredentialHasher, Credentials, Principal};
use subway_core::{DomainError, MemberId};

use crate::{Email, Member, MemberChanges, MemberName, MemberRepository, MemberStoreError, NewMember};

/// Registration / profile update payload.
#[derive(Clone)]
pub struct MemberInput {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl core::fmt::Debug for MemberInput {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemberInput")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemberError {
    #[error("{0}")]
    Validation(String),

    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error("member not found")]
    NotFound,

    #[error("{0}")]
    Hashing(String),

    #[error("{0}")]
    Store(String),
}

impl From<DomainError> for MemberError {
    fn from(value: DomainError) -> Self {
        Self::Validation(value.detail().to_string())
    }
}

impl From<MemberStoreError> for MemberError {
    fn from(value: MemberStoreError) -> Self {
        match value {
            MemberStoreError::DuplicateEmail(email) => Self::DuplicateEmail(email),
            MemberStoreError::Backend(msg) => Self::Store(msg),
        }
    }
}

struct ValidInput {
    email: Email,
    name: MemberName,
}

fn validate(input: &MemberInput) -> Result<ValidInput, MemberError> {
    let email = Email::parse(&input.email)?;
    let name = MemberName::parse(&input.name)?;
    if input.password.is_empty() {
        return Err(MemberError::Validation("password cannot be empty".to_string()));
    }
    Ok(ValidInput { email, name })
}

/// Member registration, profile management and credential checks.
///
/// Hashing and verification run on the blocking pool; argon2 is deliberately slow.
#[derive(Clone)]
pub struct MemberService<R> {
    repo: R,
    passwords: Arc<dyn CredentialHasher>,
}

impl<R> core::fmt::Debug for MemberService<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemberService").finish_non_exhaustive()
    }
}

impl<R: MemberRepository> MemberService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_hasher(repo, Arc::new(Argon2Hasher))
    }

    pub fn with_hasher(repo: R, passwords: Arc<dyn CredentialHasher>) -> Self {
        Self { repo, passwords }
    }

    async fn hash(&self, plain: &str) -> Result<String, MemberError> {
        let passwords = self.passwords.clone();
        let plain = plain.to_string();
        tokio::task::spawn_blocking(move || passwords.hash(&plain))
            .await
            .map_err(|e| MemberError::Hashing(e.to_string()))?
            .map_err(|e| MemberError::Hashing(e.to_string()))
    }

    async fn verify(&self, plain: &str, stored_hash: Option<String>) -> Result<bool, AuthError> {
        let passwords = self.passwords.clone();
        let plain = plain.to_string();
        tokio::task::spawn_blocking(move || passwords.verify(&plain, stored_hash.as_deref()))
            .await
            .map_err(|e| AuthError::Store(format!("password check aborted: {e}")))
    }

    #[tracing::instrument(skip(self))]
    pub async fn register(&self, input: &MemberInput) -> Result<Member, MemberError> {
        let valid = validate(input)?;
        let password_hash = self.hash(&input.password).await?;
        let member = self
            .repo
            .insert(NewMember {
                email: valid.email,
                password_hash,
                name: valid.name,
                created_at: Utc::now(),
            })
            .await?;
        tracing::info!(member_id = %member.id_typed(), "member registered");
        Ok(member)
    }

    pub async fn find(&self, id: MemberId) -> Result<Member, MemberError> {
        self.repo.find_by_id(id).await?.ok_or(MemberError::NotFound)
    }

    /// Replace email, password and name of an existing member.
    pub async fn update(&self, id: MemberId, input: &MemberInput) -> Result<Member, MemberError> {
        let valid = validate(input)?;
        let password_hash = self.hash(&input.password).await?;
        self.repo
            .update(
                id,
                MemberChanges {
                    email: valid.email,
                    password_hash,
                    name: valid.name,
                    updated_at: Utc::now(),
                },
            )
            .await?
            .ok_or(MemberError::NotFound)
    }

    pub async fn delete(&self, id: MemberId) -> Result<(), MemberError> {
        if self.repo.delete(id).await? {
            tracing::info!(member_id = %id, "member deleted");
            Ok(())
        } else {
            Err(MemberError::NotFound)
        }
    }

    /// Check an email/password pair.
    ///
    /// Unknown email and wrong password are the same failure, and both pay
    /// for a full password check.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Principal, AuthError> {
        let member = match Email::parse(&credentials.email) {
            Ok(email) => self
                .repo
                .find_by_email(&email)
                .await
                .map_err(|e| AuthError::Store(e.to_string()))?,
            Err(_) => None,
        };

        let stored_hash = member.as_ref().map(|m| m.password_hash().to_string());
        let verified = self.verify(&credentials.password, stored_hash).await?;
        match member {
            Some(member) if verified => Ok(member.principal()),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}
