//! First-run seeding.

use quire_core::error::QuireResult;
use quire_core::models::user::{CreateUser, UserRole};
use quire_core::repository::UserRepository;
use serde::{Deserialize, Serialize};
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::repository::SurrealUserRepository;

/// Credentials of the administrator created in an empty user table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Default for AdminSeed {
    fn default() -> Self {
        Self {
            name: "Admin".into(),
            email: "admin@example.com".into(),
            password: "password".into(),
        }
    }
}

/// Create the administrator when no user exists yet.
///
/// Returns `true` if a user was created.
pub async fn seed_admin<C: Connection>(
    db: &Surreal<C>,
    seed: &AdminSeed,
    pepper: Option<&str>,
) -> QuireResult<bool> {
    let users = SurrealUserRepository::with_pepper(db.clone(), pepper.map(str::to_string));
    if users.count().await? > 0 {
        return Ok(false);
    }

    let admin = users
        .create(CreateUser {
            name: seed.name.clone(),
            email: seed.email.clone(),
            password: seed.password.clone(),
            role: Some(UserRole::Admin),
        })
        .await?;

    info!(user_id = %admin.id, email = %admin.email, "Seeded administrator account");
    Ok(true)
}
