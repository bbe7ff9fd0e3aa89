//! Service wiring: picks the stores and builds the services the handlers use.

use std::sync::Arc;

use sqlx::PgPool;

use subway_auth::{AuthError, Hs256Jwt, Principal, SessionId, SessionStore, TokenIssuer, TokenValidator};
use subway_core::MemberId;
use subway_infra::store::{
    InMemoryMemberStore, InMemoryStationStore, PostgresMemberStore, PostgresStationStore, migrate,
};
use subway_infra::{AppConfig, InMemorySessionStore, StorageConfig};
use subway_members::{LoginService, MemberError, MemberRepository, MemberService};
use subway_stations::{StationRepository, StationService};

pub type Members = MemberService<Arc<dyn MemberRepository>>;
pub type Stations = StationService<Arc<dyn StationRepository>>;

/// Everything a handler can reach, shared behind an `Arc` extension.
pub struct AppServices {
    pub stations: Stations,
    pub members: Members,
    pub login: LoginService<Arc<dyn MemberRepository>>,
    pub tokens: Arc<dyn TokenValidator>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppServices {
    pub fn new(
        station_repo: Arc<dyn StationRepository>,
        member_repo: Arc<dyn MemberRepository>,
        jwt: Arc<Hs256Jwt>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let members = MemberService::new(member_repo);
        let issuer: Arc<dyn TokenIssuer> = jwt.clone();
        Self {
            stations: StationService::new(station_repo),
            login: LoginService::new(members.clone(), issuer),
            members,
            tokens: jwt,
            sessions,
        }
    }

    pub fn in_memory(jwt: Arc<Hs256Jwt>) -> Self {
        Self::new(
            Arc::new(InMemoryStationStore::new()),
            Arc::new(InMemoryMemberStore::new()),
            jwt.clone(),
            Arc::new(InMemorySessionStore::new(jwt.ttl())),
        )
    }

    pub async fn postgres(database_url: &str, jwt: Arc<Hs256Jwt>) -> Result<Self, sqlx::Error> {
        let pool = PgPool::connect(database_url).await?;
        migrate(&pool).await?;
        tracing::info!("connected to postgres; schema ready");

        Ok(Self::new(
            Arc::new(PostgresStationStore::new(pool.clone())),
            Arc::new(PostgresMemberStore::new(pool)),
            jwt.clone(),
            Arc::new(InMemorySessionStore::new(jwt.ttl())),
        ))
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self, sqlx::Error> {
        let jwt = Arc::new(Hs256Jwt::new(config.jwt_secret.as_bytes(), config.token_ttl));
        match &config.storage {
            StorageConfig::InMemory => {
                tracing::info!("using in-memory stores");
                Ok(Self::in_memory(jwt))
            }
            StorageConfig::Postgres { database_url } => Self::postgres(database_url, jwt).await,
        }
    }

    /// Remove a member together with every station and session they own.
    #[tracing::instrument(skip(self))]
    pub async fn withdraw_member(&self, id: MemberId) -> Result<(), MemberError> {
        self.members.delete(id).await?;
        let sessions_ended = self.sessions.remove_all_for(id);
        let removed = self
            .stations
            .delete_all_owned(id)
            .await
            .map_err(|e| MemberError::Store(e.to_string()))?;
        tracing::info!(stations_removed = removed, sessions_ended, "member withdrawn");
        Ok(())
    }

    pub fn open_session(&self, principal: Principal) -> Result<SessionId, AuthError> {
        self.sessions.create(principal)
    }
}
