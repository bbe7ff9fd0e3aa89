use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use subway_core::{DomainError, DomainResult, MemberId, StationId, ValueObject};

/// Longest accepted station name, in characters.
pub const MAX_NAME_CHARS: usize = 255;

/// Station name: trimmed, non-empty, at most [`MAX_NAME_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationName(String);

impl StationName {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(DomainError::validation("station name cannot be empty"));
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(DomainError::validation(format!(
                "station name must be at most {MAX_NAME_CHARS} characters"
            )));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for StationName {}

impl core::fmt::Display for StationName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A station, owned by the member that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    id: StationId,
    owner_id: MemberId,
    name: StationName,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Station {
    /// Rehydrate a station from storage.
    pub fn from_parts(
        id: StationId,
        owner_id: MemberId,
        name: StationName,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            name,
            created_at,
            updated_at,
        }
    }

    pub fn id_typed(&self) -> StationId {
        self.id
    }

    pub fn owner_id(&self) -> MemberId {
        self.owner_id
    }

    pub fn name(&self) -> &StationName {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_owned_by(&self, member: MemberId) -> bool {
        self.owner_id == member
    }

    /// Rename in place; the id never changes.
    pub fn rename(&mut self, name: StationName, at: DateTime<Utc>) {
        self.name = name;
        self.updated_at = at;
    }
}

/// A validated station ready to be inserted (id assigned by the store).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStation {
    pub owner_id: MemberId,
    pub name: StationName,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed() {
        let name = StationName::parse("  강남역 ").unwrap();
        assert_eq!(name.as_str(), "강남역");
        assert_eq!(name, StationName::parse("강남역").unwrap());
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(StationName::parse("").is_err());
        assert!(StationName::parse("   ").is_err());
    }

    #[test]
    fn overlong_name_is_rejected() {
        let name = "역".repeat(MAX_NAME_CHARS + 1);
        assert!(StationName::parse(&name).is_err());
        assert!(StationName::parse(&"역".repeat(MAX_NAME_CHARS)).is_ok());
    }

    #[test]
    fn rename_keeps_identity() {
        let now = Utc::now();
        let mut station = Station::from_parts(
            StationId::from_raw(1),
            MemberId::from_raw(1),
            StationName::parse("강남역").unwrap(),
            now,
            now,
        );
        let later = now + chrono::Duration::seconds(5);
        station.rename(StationName::parse("역삼역").unwrap(), later);

        assert_eq!(station.id_typed(), StationId::from_raw(1));
        assert_eq!(station.name().as_str(), "역삼역");
        assert_eq!(station.updated_at(), later);
        assert_eq!(station.created_at(), now);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: any accepted name is its own trimmed form and parsing is idempotent.
            #[test]
            fn parse_is_idempotent(raw in "\\PC{0,300}") {
                if let Ok(name) = StationName::parse(&raw) {
                    prop_assert_eq!(name.as_str(), name.as_str().trim());
                    prop_assert!(!name.as_str().is_empty());
                    prop_assert_eq!(StationName::parse(name.as_str()).unwrap(), name);
                }
            }

            /// Property: surrounding whitespace never changes the parsed name.
            #[test]
            fn padding_is_ignored(core in "[가-힣A-Za-z0-9]{1,50}", left in " {0,5}", right in " {0,5}") {
                let padded = format!("{left}{core}{right}");
                prop_assert_eq!(StationName::parse(&padded).unwrap(), StationName::parse(&core).unwrap());
            }
        }
    }
}
