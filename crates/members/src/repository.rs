use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use subway_core::MemberId;

use crate::{Email, Member, MemberChanges, NewMember};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemberStoreError {
    /// Another member already uses this email.
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error("member store backend error: {0}")]
    Backend(String),
}

/// Durable member storage.
///
/// Implementations must enforce email uniqueness atomically with the write
/// (a unique index, or the check and the insert under one lock).
#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn insert(&self, member: NewMember) -> Result<Member, MemberStoreError>;
    async fn find_by_id(&self, id: MemberId) -> Result<Option<Member>, MemberStoreError>;
    async fn find_by_email(&self, email: &Email) -> Result<Option<Member>, MemberStoreError>;
    /// Returns `Ok(None)` when no member has `id`.
    async fn update(&self, id: MemberId, changes: MemberChanges) -> Result<Option<Member>, MemberStoreError>;
    /// Returns whether a member was removed.
    async fn delete(&self, id: MemberId) -> Result<bool, MemberStoreError>;
}

#[async_trait]
impl<S> MemberRepository for Arc<S>
where
    S: MemberRepository + ?Sized,
{
    async fn insert(&self, member: NewMember) -> Result<Member, MemberStoreError> {
        (**self).insert(member).await
    }

    async fn find_by_id(&self, id: MemberId) -> Result<Option<Member>, MemberStoreError> {
        (**self).find_by_id(id).await
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Member>, MemberStoreError> {
        (**self).find_by_email(email).await
    }

    async fn update(&self, id: MemberId, changes: MemberChanges) -> Result<Option<Member>, MemberStoreError> {
        (**self).update(id, changes).await
    }

    async fn delete(&self, id: MemberId) -> Result<bool, MemberStoreError> {
        (**self).delete(id).await
    }
}
