//! Postgres-backed stores.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | Store error | Scenario |
//! |------------|----------------------|-------------|----------|
//! | Database (unique violation) | `23505` | `DuplicateName` / `DuplicateEmail` | `UNIQUE (owner_id, name)` or `UNIQUE (email)` hit |
//! | Database (other) | Any other | `Backend` | Foreign key, check constraint, ... |
//! | Other | N/A | `Backend` | Pool closed, network errors, decode failures |
//!
//! ## Owner Isolation
//!
//! Every station query carries `owner_id` in its WHERE clause. A row owned by
//! someone else is never read, renamed or deleted; the caller just sees "no row".

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use subway_core::{MemberId, StationId};
use subway_members::{Email, Member, MemberChanges, MemberName, MemberRepository, MemberStoreError, NewMember};
use subway_stations::{NewStation, Station, StationName, StationRepository, StationStoreError};

const SCHEMA: &str = include_str!("schema.sql");

/// Create tables and indexes if they do not exist yet.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

fn describe(operation: &str, err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => format!("database error in {operation}: {}", db_err.message()),
        sqlx::Error::PoolClosed => format!("connection pool closed in {operation}"),
        other => format!("{operation}: {other}"),
    }
}

fn station_error(operation: &str, name: &StationName, err: sqlx::Error) -> StationStoreError {
    if is_unique_violation(&err) {
        return StationStoreError::DuplicateName(name.to_string());
    }
    let msg = describe(operation, &err);
    tracing::warn!(error = %msg, "station store failure");
    StationStoreError::Backend(msg)
}

fn station_backend(operation: &str, err: sqlx::Error) -> StationStoreError {
    let msg = describe(operation, &err);
    tracing::warn!(error = %msg, "station store failure");
    StationStoreError::Backend(msg)
}

fn member_error(operation: &str, email: &Email, err: sqlx::Error) -> MemberStoreError {
    if is_unique_violation(&err) {
        return MemberStoreError::DuplicateEmail(email.to_string());
    }
    member_backend(operation, err)
}

fn member_backend(operation: &str, err: sqlx::Error) -> MemberStoreError {
    let msg = describe(operation, &err);
    tracing::warn!(error = %msg, "member store failure");
    MemberStoreError::Backend(msg)
}

fn station_from_row(row: &PgRow) -> Result<Station, String> {
    let id: i64 = row.try_get("id").map_err(|e| e.to_string())?;
    let owner_id: i64 = row.try_get("owner_id").map_err(|e| e.to_string())?;
    let name: String = row.try_get("name").map_err(|e| e.to_string())?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(|e| e.to_string())?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(|e| e.to_string())?;
    let name = StationName::parse(&name).map_err(|e| e.to_string())?;
    Ok(Station::from_parts(
        StationId::from_raw(id),
        MemberId::from_raw(owner_id),
        name,
        created_at,
        updated_at,
    ))
}

fn member_from_row(row: &PgRow) -> Result<Member, String> {
    let id: i64 = row.try_get("id").map_err(|e| e.to_string())?;
    let email: String = row.try_get("email").map_err(|e| e.to_string())?;
    let password_hash: String = row.try_get("password_hash").map_err(|e| e.to_string())?;
    let name: String = row.try_get("name").map_err(|e| e.to_string())?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(|e| e.to_string())?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(|e| e.to_string())?;
    Ok(Member::from_parts(
        MemberId::from_raw(id),
        Email::parse(&email).map_err(|e| e.to_string())?,
        password_hash,
        MemberName::parse(&name).map_err(|e| e.to_string())?,
        created_at,
        updated_at,
    ))
}

/// Postgres station store.
///
/// Uses the SQLx pool, which is `Send + Sync` and cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresStationStore {
    pool: PgPool,
}

impl PostgresStationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StationRepository for PostgresStationStore {
    #[instrument(skip(self, station), fields(owner_id = %station.owner_id))]
    async fn insert(&self, station: NewStation) -> Result<Station, StationStoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO stations (owner_id, name, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            RETURNING id, owner_id, name, created_at, updated_at
            "#,
        )
        .bind(station.owner_id.get())
        .bind(station.name.as_str())
        .bind(station.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| station_error("insert_station", &station.name, e))?;

        station_from_row(&row).map_err(StationStoreError::Backend)
    }

    #[instrument(skip(self))]
    async fn list_owned(&self, owner: MemberId) -> Result<Vec<Station>, StationStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, name, created_at, updated_at
            FROM stations
            WHERE owner_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(owner.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| station_backend("list_stations", e))?;

        rows.iter()
            .map(station_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StationStoreError::Backend)
    }

    #[instrument(skip(self))]
    async fn find_owned(&self, owner: MemberId, id: StationId) -> Result<Option<Station>, StationStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, name, created_at, updated_at
            FROM stations
            WHERE owner_id = $1 AND id = $2
            "#,
        )
        .bind(owner.get())
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| station_backend("find_station", e))?;

        row.as_ref()
            .map(station_from_row)
            .transpose()
            .map_err(StationStoreError::Backend)
    }

    #[instrument(skip(self, name))]
    async fn rename_owned(
        &self,
        owner: MemberId,
        id: StationId,
        name: StationName,
        at: DateTime<Utc>,
    ) -> Result<bool, StationStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE stations
            SET name = $3, updated_at = $4
            WHERE owner_id = $1 AND id = $2
            "#,
        )
        .bind(owner.get())
        .bind(id.get())
        .bind(name.as_str())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| station_error("rename_station", &name, e))?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn delete_owned(&self, owner: MemberId, id: StationId) -> Result<bool, StationStoreError> {
        let result = sqlx::query("DELETE FROM stations WHERE owner_id = $1 AND id = $2")
            .bind(owner.get())
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| station_backend("delete_station", e))?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn delete_all_owned(&self, owner: MemberId) -> Result<u64, StationStoreError> {
        let result = sqlx::query("DELETE FROM stations WHERE owner_id = $1")
            .bind(owner.get())
            .execute(&self.pool)
            .await
            .map_err(|e| station_backend("delete_owned_stations", e))?;

        Ok(result.rows_affected())
    }
}

/// Postgres member store.
#[derive(Debug, Clone)]
pub struct PostgresMemberStore {
    pool: PgPool,
}

impl PostgresMemberStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PostgresMemberStore {
    #[instrument(skip(self, member))]
    async fn insert(&self, member: NewMember) -> Result<Member, MemberStoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO members (email, password_hash, name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, email, password_hash, name, created_at, updated_at
            "#,
        )
        .bind(member.email.as_str())
        .bind(&member.password_hash)
        .bind(member.name.as_str())
        .bind(member.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| member_error("insert_member", &member.email, e))?;

        member_from_row(&row).map_err(MemberStoreError::Backend)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: MemberId) -> Result<Option<Member>, MemberStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, name, created_at, updated_at
            FROM members
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| member_backend("find_member", e))?;

        row.as_ref()
            .map(member_from_row)
            .transpose()
            .map_err(MemberStoreError::Backend)
    }

    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &Email) -> Result<Option<Member>, MemberStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, name, created_at, updated_at
            FROM members
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| member_backend("find_member_by_email", e))?;

        row.as_ref()
            .map(member_from_row)
            .transpose()
            .map_err(MemberStoreError::Backend)
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: MemberId, changes: MemberChanges) -> Result<Option<Member>, MemberStoreError> {
        let row = sqlx::query(
            r#"
            UPDATE members
            SET email = $2, password_hash = $3, name = $4, updated_at = $5
            WHERE id = $1
            RETURNING id, email, password_hash, name, created_at, updated_at
            "#,
        )
        .bind(id.get())
        .bind(changes.email.as_str())
        .bind(&changes.password_hash)
        .bind(changes.name.as_str())
        .bind(changes.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| member_error("update_member", &changes.email, e))?;

        row.as_ref()
            .map(member_from_row)
            .transpose()
            .map_err(MemberStoreError::Backend)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: MemberId) -> Result<bool, MemberStoreError> {
        // Owned stations go with the member (ON DELETE CASCADE).
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| member_backend("delete_member", e))?;

        Ok(result.rows_affected() == 1)
    }
}
