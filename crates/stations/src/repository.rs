use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use subway_core::{MemberId, StationId};

use crate::{NewStation, Station, StationName};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StationStoreError {
    /// The owner already has a station with this name.
    #[error("duplicate station name: {0}")]
    DuplicateName(String),

    #[error("station store backend error: {0}")]
    Backend(String),
}

/// Durable, owner-scoped station storage.
///
/// Every method takes the owner and must never read or touch another owner's
/// rows. Name uniqueness per owner must hold atomically with `insert` and
/// `rename_owned` (a `UNIQUE (owner_id, name)` index, or check and write under
/// one lock), so two concurrent creates cannot both succeed.
#[async_trait]
pub trait StationRepository: Send + Sync {
    async fn insert(&self, station: NewStation) -> Result<Station, StationStoreError>;

    /// All stations of `owner`, ascending by id.
    async fn list_owned(&self, owner: MemberId) -> Result<Vec<Station>, StationStoreError>;

    async fn find_owned(&self, owner: MemberId, id: StationId) -> Result<Option<Station>, StationStoreError>;

    /// Returns `Ok(false)` when `owner` has no station `id`.
    async fn rename_owned(
        &self,
        owner: MemberId,
        id: StationId,
        name: StationName,
        at: DateTime<Utc>,
    ) -> Result<bool, StationStoreError>;

    /// Returns `Ok(false)` when `owner` has no station `id`.
    async fn delete_owned(&self, owner: MemberId, id: StationId) -> Result<bool, StationStoreError>;

    /// Remove every station of `owner`, returning how many were removed.
    async fn delete_all_owned(&self, owner: MemberId) -> Result<u64, StationStoreError>;
}

#[async_trait]
impl<S> StationRepository for Arc<S>
where
    S: StationRepository + ?Sized,
{
    async fn insert(&self, station: NewStation) -> Result<Station, StationStoreError> {
        (**self).insert(station).await
    }

    async fn list_owned(&self, owner: MemberId) -> Result<Vec<Station>, StationStoreError> {
        (**self).list_owned(owner).await
    }

    async fn find_owned(&self, owner: MemberId, id: StationId) -> Result<Option<Station>, StationStoreError> {
        (**self).find_owned(owner, id).await
    }

    async fn rename_owned(
        &self,
        owner: MemberId,
        id: StationId,
        name: StationName,
        at: DateTime<Utc>,
    ) -> Result<bool, StationStoreError> {
        (**self).rename_owned(owner, id, name, at).await
    }

    async fn delete_owned(&self, owner: MemberId, id: StationId) -> Result<bool, StationStoreError> {
        (**self).delete_owned(owner, id).await
    }

    async fn delete_all_owned(&self, owner: MemberId) -> Result<u64, StationStoreError> {
        (**self).delete_all_owned(owner).await
    }
}
