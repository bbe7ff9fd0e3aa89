//! Integration tests for the services over the in-memory stores.
//!
//! Verifies:
//! - Stations are isolated per owner (list, update, delete)
//! - Duplicate names are rejected per owner only
//! - Login issues tokens that resolve back to the member

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    use subway_auth::{
        Argon2Hasher, AuthError, CredentialHasher, Credentials, Hs256Jwt, PasswordError, Principal, TokenValidator,
    };
    use subway_core::StationId;
    use subway_members::{LoginService, MemberError, MemberInput, MemberService};
    use subway_stations::{StationError, StationService};

    use crate::store::{InMemoryMemberStore, InMemoryStationStore};

    fn stations() -> StationService<Arc<InMemoryStationStore>> {
        StationService::new(Arc::new(InMemoryStationStore::new()))
    }

    fn members() -> MemberService<Arc<InMemoryMemberStore>> {
        MemberService::new(Arc::new(InMemoryMemberStore::new()))
    }

    fn input(email: &str, password: &str, name: &str) -> MemberInput {
        MemberInput {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        }
    }

    async fn two_principals(members: &MemberService<Arc<InMemoryMemberStore>>) -> (Principal, Principal) {
        let a = members.register(&input("a@email.com", "password", "a")).await.unwrap();
        let b = members.register(&input("b@email.com", "password", "b")).await.unwrap();
        (a.principal(), b.principal())
    }

    #[tokio::test]
    async fn created_station_is_listed_exactly_once() {
        let members = members();
        let (a, _) = two_principals(&members).await;
        let stations = stations();

        let created = stations.create(&a, "강남역").await.unwrap();
        let listed = stations.list_owned(&a).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id_typed(), created.id_typed());
        assert_eq!(listed[0].name().as_str(), "강남역");
    }

    #[tokio::test]
    async fn list_never_includes_other_owners_stations() {
        let members = members();
        let (a, b) = two_principals(&members).await;
        let stations = stations();

        let mine = stations.create(&a, "강남역").await.unwrap();
        stations.create(&b, "역삼역").await.unwrap();
        stations.create(&b, "강남역").await.unwrap();

        let listed = stations.list_owned(&a).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id_typed(), mine.id_typed());
        assert!(listed.iter().all(|s| s.owner_id() == a.id()));
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let members = members();
        let (a, _) = two_principals(&members).await;
        let stations = stations();

        for name in ["판교역", "강남역", "역삼역"] {
            stations.create(&a, name).await.unwrap();
        }

        let ids: Vec<StationId> = stations
            .list_owned(&a)
            .await
            .unwrap()
            .iter()
            .map(|s| s.id_typed())
            .collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_for_same_owner_only() {
        let members = members();
        let (a, b) = two_principals(&members).await;
        let stations = stations();

        stations.create(&a, "강남역").await.unwrap();

        let err = stations.create(&a, "강남역").await.unwrap_err();
        assert_eq!(err, StationError::DuplicateName("강남역".to_string()));

        // Surrounding whitespace does not dodge the check.
        let err = stations.create(&a, " 강남역 ").await.unwrap_err();
        assert!(matches!(err, StationError::DuplicateName(_)));

        assert!(stations.create(&b, "강남역").await.is_ok());
    }

    #[tokio::test]
    async fn blank_name_is_a_validation_error() {
        let members = members();
        let (a, _) = two_principals(&members).await;

        let err = stations().create(&a, "  ").await.unwrap_err();
        assert!(matches!(err, StationError::Validation(_)));
    }

    #[tokio::test]
    async fn owner_can_rename_in_place() {
        let members = members();
        let (a, _) = two_principals(&members).await;
        let stations = stations();

        let created = stations.create(&a, "강남역").await.unwrap();
        stations.update(&a, created.id_typed(), "역삼역").await.unwrap();

        let found = stations.find_owned(&a, created.id_typed()).await.unwrap();
        assert_eq!(found.id_typed(), created.id_typed());
        assert_eq!(found.name().as_str(), "역삼역");
        assert!(found.updated_at() >= created.updated_at());
    }

    #[tokio::test]
    async fn renaming_to_own_current_name_succeeds() {
        let members = members();
        let (a, _) = two_principals(&members).await;
        let stations = stations();

        let created = stations.create(&a, "강남역").await.unwrap();
        assert!(stations.update(&a, created.id_typed(), "강남역").await.is_ok());
    }

    #[tokio::test]
    async fn renaming_onto_another_owned_name_is_rejected() {
        let members = members();
        let (a, _) = two_principals(&members).await;
        let stations = stations();

        stations.create(&a, "강남역").await.unwrap();
        let other = stations.create(&a, "역삼역").await.unwrap();

        let err = stations.update(&a, other.id_typed(), "강남역").await.unwrap_err();
        assert!(matches!(err, StationError::DuplicateName(_)));
    }

    #[tokio::test]
    async fn foreign_and_missing_stations_are_not_found() {
        let members = members();
        let (a, b) = two_principals(&members).await;
        let stations = stations();

        let created = stations.create(&a, "강남역").await.unwrap();
        let missing = StationId::from_raw(999);

        for id in [created.id_typed(), missing] {
            assert_eq!(stations.update(&b, id, "역삼역").await, Err(StationError::NotFound));
            assert_eq!(stations.delete(&b, id).await, Err(StationError::NotFound));
            assert_eq!(stations.find_owned(&b, id).await.unwrap_err(), StationError::NotFound);
        }

        // The owner's station is untouched.
        let found = stations.find_owned(&a, created.id_typed()).await.unwrap();
        assert_eq!(found.name().as_str(), "강남역");
    }

    #[tokio::test]
    async fn delete_is_final() {
        let members = members();
        let (a, _) = two_principals(&members).await;
        let stations = stations();

        let created = stations.create(&a, "강남역").await.unwrap();
        stations.delete(&a, created.id_typed()).await.unwrap();

        assert_eq!(stations.delete(&a, created.id_typed()).await, Err(StationError::NotFound));
        assert!(stations.list_owned(&a).await.unwrap().is_empty());

        // The name is free again, under a new id.
        let again = stations.create(&a, "강남역").await.unwrap();
        assert_ne!(again.id_typed(), created.id_typed());
    }

    #[tokio::test]
    async fn delete_all_owned_leaves_other_owners_alone() {
        let members = members();
        let (a, b) = two_principals(&members).await;
        let stations = stations();

        stations.create(&a, "강남역").await.unwrap();
        stations.create(&a, "역삼역").await.unwrap();
        stations.create(&b, "강남역").await.unwrap();

        assert_eq!(stations.delete_all_owned(a.id()).await.unwrap(), 2);
        assert!(stations.list_owned(&a).await.unwrap().is_empty());
        assert_eq!(stations.list_owned(&b).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_with_same_name_admit_one() {
        let members = members();
        let (a, _) = two_principals(&members).await;
        let stations = stations();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let stations = stations.clone();
            let a = a.clone();
            handles.push(tokio::spawn(async move { stations.create(&a, "강남역").await }));
        }

        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(stations.list_owned(&a).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn registering_same_email_twice_fails() {
        let members = members();
        members.register(&input("a@email.com", "password", "a")).await.unwrap();

        let err = members
            .register(&input("A@Email.com ", "other", "a2"))
            .await
            .unwrap_err();
        assert!(matches!(err, MemberError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn member_update_rehashes_password() {
        let members = members();
        let created = members.register(&input("a@email.com", "password", "a")).await.unwrap();

        members
            .update(created.id_typed(), &input("a@email.com", "new-password", "a"))
            .await
            .unwrap();

        let old = members.authenticate(&Credentials::new("a@email.com", "password")).await;
        assert_eq!(old, Err(AuthError::InvalidCredentials));
        let new = members
            .authenticate(&Credentials::new("a@email.com", "new-password"))
            .await
            .unwrap();
        assert_eq!(new.id(), created.id_typed());
    }

    #[tokio::test]
    async fn missing_member_is_not_found() {
        let members = members();
        let id = subway_core::MemberId::from_raw(42);

        assert_eq!(members.find(id).await.unwrap_err(), MemberError::NotFound);
        assert_eq!(members.delete(id).await, Err(MemberError::NotFound));
    }

    #[tokio::test]
    async fn issued_token_resolves_to_the_logged_in_member() {
        let members = members();
        let created = members.register(&input("a@email.com", "password", "a")).await.unwrap();

        let jwt = Arc::new(Hs256Jwt::new(b"test-secret", chrono::Duration::minutes(5)));
        let login = LoginService::new(members, jwt.clone());

        let token = login
            .issue_token(&Credentials::new("a@email.com", "password"))
            .await
            .unwrap();
        let claims = jwt.validate(token.as_str(), Utc::now()).unwrap();

        assert_eq!(claims.sub, created.id_typed());
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_fail_identically() {
        let members = members();
        members.register(&input("a@email.com", "password", "a")).await.unwrap();

        let jwt = Arc::new(Hs256Jwt::new(b"test-secret", chrono::Duration::minutes(5)));
        let login = LoginService::new(members, jwt);

        let wrong_password = login
            .issue_token(&Credentials::new("a@email.com", "nope"))
            .await
            .unwrap_err();
        let unknown = login
            .issue_token(&Credentials::new("ghost@email.com", "password"))
            .await
            .unwrap_err();

        assert_eq!(wrong_password, AuthError::InvalidCredentials);
        assert_eq!(wrong_password, unknown);
    }

    /// Argon2 hasher that counts password checks, split by whether a stored hash was present.
    #[derive(Default)]
    struct CountingHasher {
        with_hash: AtomicUsize,
        without_hash: AtomicUsize,
    }

    impl CredentialHasher for CountingHasher {
        fn hash(&self, plain: &str) -> Result<String, PasswordError> {
            Argon2Hasher.hash(plain)
        }

        fn verify(&self, plain: &str, stored_hash: Option<&str>) -> bool {
            match stored_hash {
                Some(_) => self.with_hash.fetch_add(1, Ordering::SeqCst),
                None => self.without_hash.fetch_add(1, Ordering::SeqCst),
            };
            Argon2Hasher.verify(plain, stored_hash)
        }
    }

    #[tokio::test]
    async fn every_failed_login_pays_for_a_password_check() {
        let hasher = Arc::new(CountingHasher::default());
        let members = MemberService::with_hasher(Arc::new(InMemoryMemberStore::new()), hasher.clone());
        members.register(&input("a@email.com", "password", "a")).await.unwrap();

        let unknown = members.authenticate(&Credentials::new("ghost@email.com", "password")).await;
        let unparsable = members.authenticate(&Credentials::new("not-an-email", "password")).await;
        assert_eq!(unknown, Err(AuthError::InvalidCredentials));
        assert_eq!(unparsable, Err(AuthError::InvalidCredentials));
        assert_eq!(hasher.without_hash.load(Ordering::SeqCst), 2);

        let wrong = members.authenticate(&Credentials::new("a@email.com", "nope")).await;
        assert_eq!(wrong, Err(AuthError::InvalidCredentials));
        assert_eq!(hasher.with_hash.load(Ordering::SeqCst), 1);
    }
}
