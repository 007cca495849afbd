//! Integration tests for the User repository and admin seeding.

use quire_core::error::QuireError;
use quire_core::models::user::{CreateUser, UpdateUser, UserRole};
use quire_core::repository::{Pagination, UserRepository};
use quire_db::repository::SurrealUserRepository;
use quire_db::{AdminSeed, seed_admin};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    quire_db::run_migrations(&db).await.unwrap();
    db
}

fn alice() -> CreateUser {
    CreateUser {
        name: "Alice".into(),
        email: "alice@example.com".into(),
        password: "SuperSecret123!".into(),
        role: None,
    }
}

#[tokio::test]
async fn create_hashes_password() {
    let repo = SurrealUserRepository::new(setup().await);

    let user = repo.create(alice()).await.unwrap();
    assert_eq!(user.role, UserRole::Editor);
    assert_ne!(user.password_hash, "SuperSecret123!");
    assert!(user.password_hash.starts_with("$argon2id$"));

    let fetched = repo.get_by_email("Alice@Example.com").await.unwrap();
    assert_eq!(fetched.id, user.id);
}

#[tokio::test]
async fn same_password_hashes_differently() {
    let repo = SurrealUserRepository::new(setup().await);
    let a = repo.create(alice()).await.unwrap();
    let b = repo
        .create(CreateUser {
            email: "bob@example.com".into(),
            name: "Bob".into(),
            ..alice()
        })
        .await
        .unwrap();
    assert_ne!(a.password_hash, b.password_hash);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let repo = SurrealUserRepository::new(setup().await);
    let first = repo.create(alice()).await.unwrap();

    let err = repo.create(alice()).await.unwrap_err();
    assert!(matches!(err, QuireError::Conflict { .. }));

    let bob = repo
        .create(CreateUser {
            email: "bob@example.com".into(),
            ..alice()
        })
        .await
        .unwrap();
    let err = repo
        .update(
            bob.id,
            UpdateUser {
                email: Some(first.email.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, QuireError::Conflict { .. }));
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    let repo = SurrealUserRepository::new(setup().await);
    for input in [
        CreateUser {
            name: String::new(),
            ..alice()
        },
        CreateUser {
            email: "not-an-email".into(),
            ..alice()
        },
        CreateUser {
            password: String::new(),
            ..alice()
        },
    ] {
        let err = repo.create(input).await.unwrap_err();
        assert!(matches!(err, QuireError::Validation { .. }));
    }
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn update_rehashes_password_and_changes_role() {
    let repo = SurrealUserRepository::new(setup().await);
    let user = repo.create(alice()).await.unwrap();

    let updated = repo
        .update(
            user.id,
            UpdateUser {
                password: Some("another-password".into()),
                role: Some(UserRole::Admin),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.role, UserRole::Admin);
    assert_ne!(updated.password_hash, user.password_hash);
    assert_eq!(updated.name, "Alice");
}

#[tokio::test]
async fn delete_and_list() {
    let repo = SurrealUserRepository::new(setup().await);
    let user = repo.create(alice()).await.unwrap();
    repo.create(CreateUser {
        email: "bob@example.com".into(),
        ..alice()
    })
    .await
    .unwrap();

    let list = repo.list(Pagination::default()).await.unwrap();
    assert_eq!(list.total, 2);
    assert!(list.items.iter().all(|u| !u.password_hash.is_empty()));

    repo.delete(user.id).await.unwrap();
    let err = repo.get_by_id(user.id).await.unwrap_err();
    assert!(matches!(err, QuireError::NotFound { .. }));
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn admin_is_seeded_only_into_empty_table() {
    let db = setup().await;
    let seed = AdminSeed::default();

    assert!(seed_admin(&db, &seed, None).await.unwrap());
    assert!(!seed_admin(&db, &seed, None).await.unwrap());

    let repo = SurrealUserRepository::new(db);
    let admin = repo.get_by_email("admin@example.com").await.unwrap();
    assert_eq!(admin.role, UserRole::Admin);
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_signups_with_one_email_admit_one() {
    let repo = SurrealUserRepository::new(setup().await);

    for round in 0..5u64 {
        let email = format!("race-{round}@example.com");
        let signup = || {
            repo.create(CreateUser {
                email: email.clone(),
                ..alice()
            })
        };
        let (a, b) = tokio::join!(signup(), signup());
        let outcomes = [a, b];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1, "round {round}");
        assert!(
            outcomes.iter().any(|r| matches!(
                r,
                Err(QuireError::Conflict { entity, field }) if entity == "user" && field == "email"
            )),
            "round {round}: {outcomes:?}"
        );
        assert_eq!(repo.count().await.unwrap(), round + 1);
    }
}
