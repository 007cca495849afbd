//! Server configuration.
//!
//! Built from serialized defaults overlaid with `QUIRE_`-prefixed
//! environment variables, `__` separating nested keys:
//!
//! ```text
//! QUIRE_BIND_ADDR=0.0.0.0:8080
//! QUIRE_TENANCY=multi
//! QUIRE_DATABASE__URL=ws://localhost:8000
//! QUIRE_AUTH__JWT_SECRET=...
//! QUIRE_ADMIN__PASSWORD=...
//! ```

use figment::Figment;
use figment::providers::{Env, Serialized};
use quire_auth::AuthConfig;
use quire_core::tenant::TenancyMode;
use quire_db::{AdminSeed, DbConfig, Provisioning};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    #[error("auth.jwt_secret must be set (QUIRE_AUTH__JWT_SECRET)")]
    MissingJwtSecret,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub tenancy: TenancyMode,
    /// Origins allowed to call the API with credentials. Empty allows any
    /// origin without credentials.
    pub cors_origins: Vec<String>,
    /// Create the administrator in every empty user table.
    pub seed_admin: bool,
    pub database: DbConfig,
    pub auth: AuthConfig,
    pub admin: AdminSeed,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".into(),
            tenancy: TenancyMode::default(),
            cors_origins: Vec::new(),
            seed_admin: true,
            database: DbConfig::default(),
            auth: AuthConfig::default(),
            admin: AdminSeed::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults merged with the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Self::default()))
                .merge(Env::prefixed("QUIRE_").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        Ok(())
    }

    /// How each newly opened database gets prepared.
    pub fn provisioning(&self) -> Provisioning {
        Provisioning {
            admin: self.seed_admin.then(|| self.admin.clone()),
            pepper: self.auth.pepper.clone(),
        }
    }
}
