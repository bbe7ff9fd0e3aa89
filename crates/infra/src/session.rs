//! In-memory session store.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use subway_auth::{AuthError, Principal, SessionId, SessionStore};
use subway_core::MemberId;

#[derive(Debug, Clone)]
struct SessionEntry {
    principal: Principal,
    expires_at: DateTime<Utc>,
}

impl SessionEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Process-local session store. Sessions are lost on restart.
///
/// Expired entries are evicted when looked up and swept on every new login.
#[derive(Debug)]
pub struct InMemorySessionStore {
    ttl: Duration,
    inner: RwLock<HashMap<SessionId, SessionEntry>>,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::hours(1))
    }
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, principal: Principal) -> Result<SessionId, AuthError> {
        let now = Utc::now();
        let mut map = self
            .inner
            .write()
            .map_err(|_| AuthError::Store("session store lock poisoned".to_string()))?;

        map.retain(|_, entry| entry.is_live(now));

        let id = SessionId::new();
        map.insert(
            id,
            SessionEntry {
                principal,
                expires_at: now + self.ttl,
            },
        );
        Ok(id)
    }

    fn get(&self, id: &SessionId) -> Option<Principal> {
        let now = Utc::now();
        {
            let map = self.inner.read().ok()?;
            match map.get(id) {
                None => return None,
                Some(entry) if entry.is_live(now) => return Some(entry.principal.clone()),
                Some(_) => {}
            }
        }

        if let Ok(mut map) = self.inner.write() {
            if map.get(id).is_some_and(|entry| !entry.is_live(now)) {
                map.remove(id);
            }
        }
        tracing::debug!("expired session evicted");
        None
    }

    fn remove_all_for(&self, member: MemberId) -> usize {
        let Ok(mut map) = self.inner.write() else {
            tracing::error!(member_id = %member, "session store lock poisoned; sessions not removed");
            return 0;
        };
        let before = map.len();
        map.retain(|_, entry| entry.principal.id() != member);
        before - map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(id: i64) -> Principal {
        Principal::new(MemberId::from_raw(id), "a@b.c")
    }

    #[test]
    fn created_session_resolves() {
        let store = InMemorySessionStore::default();
        let id = store.create(principal(3)).unwrap();
        assert_eq!(store.get(&id), Some(principal(3)));
    }

    #[test]
    fn unknown_session_resolves_to_nothing() {
        let store = InMemorySessionStore::default();
        assert_eq!(store.get(&SessionId::new()), None);
    }

    #[test]
    fn expired_session_is_rejected_and_evicted() {
        let store = InMemorySessionStore::new(Duration::zero());
        let id = store.create(principal(3)).unwrap();

        assert_eq!(store.get(&id), None);
        assert!(store.is_empty());
    }

    #[test]
    fn new_login_sweeps_expired_sessions() {
        let store = InMemorySessionStore::new(Duration::zero());
        for _ in 0..5 {
            store.create(principal(3)).unwrap();
        }
        // Only the session just created survives the sweep.
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_all_for_drops_only_that_members_sessions() {
        let store = InMemorySessionStore::default();
        let a1 = store.create(principal(1)).unwrap();
        let a2 = store.create(principal(1)).unwrap();
        let b = store.create(principal(2)).unwrap();

        assert_eq!(store.remove_all_for(MemberId::from_raw(1)), 2);
        assert_eq!(store.get(&a1), None);
        assert_eq!(store.get(&a2), None);
        assert_eq!(store.get(&b), Some(principal(2)));
    }
}
