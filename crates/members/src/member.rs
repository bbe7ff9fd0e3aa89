use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use subway_core::{DomainError, DomainResult, MemberId, ValueObject};

/// Login identifier. Stored trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let email = raw.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }
        Ok(Self(email))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Email {}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberName(String);

impl MemberName {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for MemberName {}

/// A registered member.
///
/// `password_hash` is an argon2 PHC string; it never leaves the service layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    id: MemberId,
    email: Email,
    password_hash: String,
    name: MemberName,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Member {
    /// Rehydrate a member from storage.
    pub fn from_parts(
        id: MemberId,
        email: Email,
        password_hash: String,
        name: MemberName,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            password_hash,
            name,
            created_at,
            updated_at,
        }
    }

    pub fn id_typed(&self) -> MemberId {
        self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn name(&self) -> &MemberName {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn principal(&self) -> subway_auth::Principal {
        subway_auth::Principal::new(self.id, self.email.as_str())
    }
}

/// A validated member ready to be inserted (id assigned by the store).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub email: Email,
    pub password_hash: String,
    pub name: MemberName,
    pub created_at: DateTime<Utc>,
}

/// Full replacement of a member's mutable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberChanges {
    pub email: Email,
    pub password_hash: String,
    pub name: MemberName,
    pub updated_at: DateTime<Utc>,
}
