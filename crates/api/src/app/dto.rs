use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use subway_auth::Credentials;
use subway_core::{MemberId, StationId};
use subway_members::{Member, MemberInput};
use subway_stations::Station;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct StationRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct MemberRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl From<MemberRequest> for MemberInput {
    fn from(value: MemberRequest) -> Self {
        Self {
            email: value.email,
            password: value.password,
            name: value.name,
        }
    }
}

#[derive(Deserialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

impl From<TokenRequest> for Credentials {
    fn from(value: TokenRequest) -> Self {
        Credentials::new(value.email, value.password)
    }
}

/// Form login body (`application/x-www-form-urlencoded`).
#[derive(Deserialize)]
pub struct SessionLoginForm {
    pub username: String,
    pub password: String,
}

impl From<SessionLoginForm> for Credentials {
    fn from(value: SessionLoginForm) -> Self {
        Credentials::new(value.username, value.password)
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationResponse {
    pub id: StationId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Station> for StationResponse {
    fn from(station: &Station) -> Self {
        Self {
            id: station.id_typed(),
            name: station.name().as_str().to_string(),
            created_at: station.created_at(),
            updated_at: station.updated_at(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MemberResponse {
    pub id: MemberId,
    pub email: String,
    pub name: String,
}

impl From<&Member> for MemberResponse {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id_typed(),
            email: member.email().as_str().to_string(),
            name: member.name().as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
}
