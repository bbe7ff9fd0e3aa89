//! In-memory stores for tests/dev.
//!
//! Each store keeps all rows under one `RwLock`, so a uniqueness check and the
//! write it guards happen under the same write guard.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use subway_core::{MemberId, StationId};
use subway_members::{Email, Member, MemberChanges, MemberRepository, MemberStoreError, NewMember};
use subway_stations::{NewStation, Station, StationName, StationRepository, StationStoreError};

fn poisoned<E>(make: impl FnOnce(String) -> E) -> E {
    make("lock poisoned".to_string())
}

#[derive(Debug, Default)]
struct StationTable {
    last_id: i64,
    // BTreeMap keeps iteration in ascending id order.
    rows: BTreeMap<StationId, Station>,
}

impl StationTable {
    fn name_taken(&self, owner: MemberId, name: &StationName, except: Option<StationId>) -> bool {
        self.rows
            .values()
            .any(|s| s.is_owned_by(owner) && s.name() == name && Some(s.id_typed()) != except)
    }
}

/// In-memory owner-scoped station store.
#[derive(Debug, Default)]
pub struct InMemoryStationStore {
    inner: RwLock<StationTable>,
}

impl InMemoryStationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StationRepository for InMemoryStationStore {
    async fn insert(&self, station: NewStation) -> Result<Station, StationStoreError> {
        let mut table = self
            .inner
            .write()
            .map_err(|_| poisoned(StationStoreError::Backend))?;

        if table.name_taken(station.owner_id, &station.name, None) {
            return Err(StationStoreError::DuplicateName(station.name.to_string()));
        }

        table.last_id += 1;
        let id = StationId::from_raw(table.last_id);
        let stored = Station::from_parts(id, station.owner_id, station.name, station.created_at, station.created_at);
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list_owned(&self, owner: MemberId) -> Result<Vec<Station>, StationStoreError> {
        let table = self
            .inner
            .read()
            .map_err(|_| poisoned(StationStoreError::Backend))?;

        Ok(table
            .rows
            .values()
            .filter(|s| s.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn find_owned(&self, owner: MemberId, id: StationId) -> Result<Option<Station>, StationStoreError> {
        let table = self
            .inner
            .read()
            .map_err(|_| poisoned(StationStoreError::Backend))?;

        Ok(table.rows.get(&id).filter(|s| s.is_owned_by(owner)).cloned())
    }

    async fn rename_owned(
        &self,
        owner: MemberId,
        id: StationId,
        name: StationName,
        at: DateTime<Utc>,
    ) -> Result<bool, StationStoreError> {
        let mut table = self
            .inner
            .write()
            .map_err(|_| poisoned(StationStoreError::Backend))?;

        if !table.rows.get(&id).is_some_and(|s| s.is_owned_by(owner)) {
            return Ok(false);
        }
        if table.name_taken(owner, &name, Some(id)) {
            return Err(StationStoreError::DuplicateName(name.to_string()));
        }
        if let Some(station) = table.rows.get_mut(&id) {
            station.rename(name, at);
        }
        Ok(true)
    }

    async fn delete_owned(&self, owner: MemberId, id: StationId) -> Result<bool, StationStoreError> {
        let mut table = self
            .inner
            .write()
            .map_err(|_| poisoned(StationStoreError::Backend))?;

        if !table.rows.get(&id).is_some_and(|s| s.is_owned_by(owner)) {
            return Ok(false);
        }
        table.rows.remove(&id);
        Ok(true)
    }

    async fn delete_all_owned(&self, owner: MemberId) -> Result<u64, StationStoreError> {
        let mut table = self
            .inner
            .write()
            .map_err(|_| poisoned(StationStoreError::Backend))?;

        let before = table.rows.len();
        table.rows.retain(|_id, s| !s.is_owned_by(owner));
        Ok((before - table.rows.len()) as u64)
    }
}

#[derive(Debug, Default)]
struct MemberTable {
    last_id: i64,
    rows: BTreeMap<MemberId, Member>,
}

impl MemberTable {
    fn email_taken(&self, email: &Email, except: Option<MemberId>) -> bool {
        self.rows
            .values()
            .any(|m| m.email() == email && Some(m.id_typed()) != except)
    }
}

/// In-memory member store.
#[derive(Debug, Default)]
pub struct InMemoryMemberStore {
    inner: RwLock<MemberTable>,
}

impl InMemoryMemberStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberRepository for InMemoryMemberStore {
    async fn insert(&self, member: NewMember) -> Result<Member, MemberStoreError> {
        let mut table = self
            .inner
            .write()
            .map_err(|_| poisoned(MemberStoreError::Backend))?;

        if table.email_taken(&member.email, None) {
            return Err(MemberStoreError::DuplicateEmail(member.email.to_string()));
        }

        table.last_id += 1;
        let id = MemberId::from_raw(table.last_id);
        let stored = Member::from_parts(
            id,
            member.email,
            member.password_hash,
            member.name,
            member.created_at,
            member.created_at,
        );
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: MemberId) -> Result<Option<Member>, MemberStoreError> {
        let table = self
            .inner
            .read()
            .map_err(|_| poisoned(MemberStoreError::Backend))?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Member>, MemberStoreError> {
        let table = self
            .inner
            .read()
            .map_err(|_| poisoned(MemberStoreError::Backend))?;
        Ok(table.rows.values().find(|m| m.email() == email).cloned())
    }

    async fn update(&self, id: MemberId, changes: MemberChanges) -> Result<Option<Member>, MemberStoreError> {
        let mut table = self
            .inner
            .write()
            .map_err(|_| poisoned(MemberStoreError::Backend))?;

        let Some(created_at) = table.rows.get(&id).map(|m| m.created_at()) else {
            return Ok(None);
        };
        if table.email_taken(&changes.email, Some(id)) {
            return Err(MemberStoreError::DuplicateEmail(changes.email.to_string()));
        }

        let updated = Member::from_parts(
            id,
            changes.email,
            changes.password_hash,
            changes.name,
            created_at,
            changes.updated_at,
        );
        table.rows.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: MemberId) -> Result<bool, MemberStoreError> {
        let mut table = self
            .inner
            .write()
            .map_err(|_| poisoned(MemberStoreError::Backend))?;
        Ok(table.rows.remove(&id).is_some())
    }
}
