use chrono::Utc;
use thiserror::Error;

use subway_auth::Principal;
use subway_core::{DomainError, MemberId, StationId};

use crate::{NewStation, Station, StationName, StationRepository, StationStoreError};

/// Outcome of a station operation, matched on by the HTTP layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StationError {
    #[error("{0}")]
    Validation(String),

    #[error("station name already exists: {0}")]
    DuplicateName(String),

    /// Absent, or owned by another member. Callers cannot tell which.
    #[error("station not found")]
    NotFound,

    #[error("{0}")]
    Store(String),
}

impl From<DomainError> for StationError {
    fn from(value: DomainError) -> Self {
        Self::Validation(value.detail().to_string())
    }
}

impl From<StationStoreError> for StationError {
    fn from(value: StationStoreError) -> Self {
        match value {
            StationStoreError::DuplicateName(name) => Self::DuplicateName(name),
            StationStoreError::Backend(msg) => Self::Store(msg),
        }
    }
}

/// Owner-scoped station CRUD.
#[derive(Debug, Clone)]
pub struct StationService<R> {
    repo: R,
}

impl<R: StationRepository> StationService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    #[tracing::instrument(skip(self, principal), fields(member_id = %principal.id()))]
    pub async fn create(&self, principal: &Principal, name: &str) -> Result<Station, StationError> {
        let name = StationName::parse(name)?;
        let station = self
            .repo
            .insert(NewStation {
                owner_id: principal.id(),
                name,
                created_at: Utc::now(),
            })
            .await?;
        tracing::info!(station_id = %station.id_typed(), "station created");
        Ok(station)
    }

    pub async fn list_owned(&self, principal: &Principal) -> Result<Vec<Station>, StationError> {
        Ok(self.repo.list_owned(principal.id()).await?)
    }

    pub async fn find_owned(&self, principal: &Principal, id: StationId) -> Result<Station, StationError> {
        self.repo
            .find_owned(principal.id(), id)
            .await?
            .ok_or(StationError::NotFound)
    }

    #[tracing::instrument(skip(self, principal), fields(member_id = %principal.id()))]
    pub async fn update(&self, principal: &Principal, id: StationId, new_name: &str) -> Result<(), StationError> {
        let name = StationName::parse(new_name)?;
        if self.repo.rename_owned(principal.id(), id, name, Utc::now()).await? {
            Ok(())
        } else {
            Err(StationError::NotFound)
        }
    }

    #[tracing::instrument(skip(self, principal), fields(member_id = %principal.id()))]
    pub async fn delete(&self, principal: &Principal, id: StationId) -> Result<(), StationError> {
        if self.repo.delete_owned(principal.id(), id).await? {
            tracing::info!("station deleted");
            Ok(())
        } else {
            Err(StationError::NotFound)
        }
    }

    /// Drop every station of a member that is leaving.
    pub async fn delete_all_owned(&self, owner: MemberId) -> Result<u64, StationError> {
        Ok(self.repo.delete_all_owned(owner).await?)
    }
}
