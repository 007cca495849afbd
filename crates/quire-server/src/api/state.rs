use std::sync::Arc;

use quire_auth::AuthConfig;
use quire_db::TenantResolver;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<TenantResolver>,
    pub auth: Arc<AuthConfig>,
    /// Exact origins allowed to send credentialed requests.
    pub cors_origins: Arc<[String]>,
}

impl AppState {
    pub fn new(resolver: Arc<TenantResolver>, auth: AuthConfig) -> Self {
        Self {
            resolver,
            auth: Arc::new(auth),
            cors_origins: Arc::from(Vec::new()),
        }
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Arc::from(origins);
        self
    }
}
