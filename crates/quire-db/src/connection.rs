//! SurrealDB connection management.

use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;

/// Configuration for connecting to SurrealDB.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Engine URL: `mem://` for an embedded in-memory store,
    /// `ws://host:port` for a server.
    pub url: String,
    /// SurrealDB namespace.
    pub namespace: String,
    /// Database used in single-tenant mode.
    pub database: String,
    /// Root credentials. Sign-in is skipped when either is absent.
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "mem://".into(),
            namespace: "quire".into(),
            database: "main".into(),
            username: None,
            password: None,
        }
    }
}

/// Manages a connection to SurrealDB.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Any>,
}

impl DbManager {
    /// Connect to the configured namespace and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        Self::connect_database(config, &config.database).await
    }

    /// Connect to `database` inside the configured namespace.
    ///
    /// Every call opens its own connection, so handles for different
    /// databases never share session state.
    pub async fn connect_database(config: &DbConfig, database: &str) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %database,
            "Connecting to SurrealDB"
        );

        let db = any::connect(config.url.as_str()).await?;

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            db.signin(Root {
                username: username.clone(),
                password: password.clone(),
            })
            .await?;
        }

        db.use_ns(&config.namespace).use_db(database).await?;

        Ok(Self { db })
    }

    /// Returns a reference to the underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<Any> {
        &self.db
    }

    pub fn into_client(self) -> Surreal<Any> {
        self.db
    }
}
