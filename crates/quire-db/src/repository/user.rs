//! SurrealDB implementation of [`UserRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) can be
//! provided at construction time.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use quire_core::error::{QuireError, QuireResult};
use quire_core::models::user::{CreateUser, UpdateUser, User, UserRole};
use quire_core::repository::{PaginatedResult, Pagination, UserRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::{CountRow, UniqueIndex, parse_uuid, required};
use crate::error::DbError;

const SELECT_USER: &str =
    "SELECT meta::id(id) AS record_id, * FROM type::record('user', $id)";

const EMAIL: UniqueIndex = UniqueIndex {
    entity: "user",
    name: "idx_user_email",
    field: "email",
};

#[derive(Debug, SurrealValue)]
struct UserRow {
    record_id: String,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        let role: UserRole = self
            .role
            .parse()
            .map_err(|_| DbError::Encoding(format!("unknown user role: {}", self.role)))?;
        Ok(User {
            id: parse_uuid(&self.record_id)?,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Emails compare case-insensitively.
fn normalize_email(email: &str) -> QuireResult<String> {
    let email = required("email", email)?.to_lowercase();
    if !email.contains('@') {
        return Err(QuireError::validation("email is not a valid address"));
    }
    Ok(email)
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
pub fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    // OWASP ASVS: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Encoding(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| DbError::Encoding(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: Option<String>) -> Self {
        Self { db, pepper }
    }

    async fn ensure_email_free(&self, email: &str, exclude: Option<Uuid>) -> QuireResult<()> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM user \
                 WHERE email = $email AND meta::id(id) != $exclude GROUP ALL",
            )
            .bind(("email", email.to_string()))
            .bind((
                "exclude",
                exclude.map(|id| id.to_string()).unwrap_or_default(),
            ))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        if rows.first().map(|r| r.total).unwrap_or(0) > 0 {
            return Err(QuireError::conflict("user", "email"));
        }
        Ok(())
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> QuireResult<User> {
        let name = required("name", &input.name)?;
        let email = normalize_email(&input.email)?;
        if input.password.is_empty() {
            return Err(QuireError::validation("password is required"));
        }
        self.ensure_email_free(&email, None).await?;

        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;
        let role = input.role.unwrap_or_default();

        let id = Uuid::new_v4();
        let mut result = self
            .db
            .query(format!(
                "CREATE type::record('user', $id) SET \
                 name = $name, email = $email, \
                 password_hash = $password_hash, role = $role; \
                 {SELECT_USER};"
            ))
            .bind(("id", id.to_string()))
            .bind(("name", name))
            .bind(("email", email))
            .bind(("password_hash", password_hash))
            .bind(("role", role.as_str().to_string()))
            .await
            .map_err(|e| EMAIL.write_error(e))?
            .check()
            .map_err(|e| EMAIL.write_error(e))?;

        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", id))?;

        debug!(user_id = %id, role = %role, "User created");
        Ok(row.try_into_user()?)
    }

    async fn get_by_id(&self, id: Uuid) -> QuireResult<User> {
        let mut result = self
            .db
            .query(SELECT_USER)
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", id))?;
        Ok(row.try_into_user()?)
    }

    async fn get_by_email(&self, email: &str) -> QuireResult<User> {
        let email = email.trim().to_lowercase();
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE email = $email LIMIT 1",
            )
            .bind(("email", email.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", format!("email={email}")))?;
        Ok(row.try_into_user()?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> QuireResult<User> {
        let current = self.get_by_id(id).await?;

        let mut sets = Vec::new();
        let name = input.name.as_deref().map(|n| required("name", n)).transpose()?;
        if name.is_some() {
            sets.push("name = $name");
        }
        let email = input.email.as_deref().map(normalize_email).transpose()?;
        let email_changed = email.as_ref().is_some_and(|e| *e != current.email);
        if let Some(ref email) = email {
            if email_changed {
                self.ensure_email_free(email, Some(id)).await?;
            }
            sets.push("email = $email");
        }
        let password_hash = match input.password.as_deref() {
            Some("") => return Err(QuireError::validation("password must not be empty")),
            Some(password) => Some(hash_password(password, self.pepper.as_deref())?),
            None => None,
        };
        if password_hash.is_some() {
            sets.push("password_hash = $password_hash");
        }
        if input.role.is_some() {
            sets.push("role = $role");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $id) SET {}; {SELECT_USER};",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id.to_string()));
        if let Some(name) = name {
            builder = builder.bind(("name", name));
        }
        if let Some(email) = email {
            builder = builder.bind(("email", email));
        }
        if let Some(password_hash) = password_hash {
            builder = builder.bind(("password_hash", password_hash));
        }
        if let Some(role) = input.role {
            builder = builder.bind(("role", role.as_str().to_string()));
        }

        let write_error = move |e: surrealdb::Error| -> QuireError {
            if email_changed {
                EMAIL.write_error(e)
            } else {
                DbError::query(e).into()
            }
        };
        let mut result = builder
            .await
            .map_err(write_error)?
            .check()
            .map_err(write_error)?;

        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", id))?;
        Ok(row.try_into_user()?)
    }

    async fn delete(&self, id: Uuid) -> QuireResult<()> {
        self.get_by_id(id).await?;

        self.db
            .query("DELETE type::record('user', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::query)?;

        debug!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> QuireResult<PaginatedResult<User>> {
        let query = format!(
            "SELECT count() AS total FROM user GROUP ALL; \
             SELECT meta::id(id) AS record_id, * FROM user \
             ORDER BY created_at DESC {};",
            pagination.clause()
        );

        let mut result = self.db.query(&query).await.map_err(DbError::from)?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(UserRow::try_into_user)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult::new(items, total, pagination))
    }

    async fn count(&self) -> QuireResult<u64> {
        let mut result = self
            .db
            .query("SELECT count() AS total FROM user GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
