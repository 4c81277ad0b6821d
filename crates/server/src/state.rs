//! Shared application state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::auth::JwtKeys;

/// Application state shared across all request handlers.
///
/// Cheap to clone; the inner data lives behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    jwt: JwtKeys,
}

impl AppState {
    /// Build the state from loaded configuration and a connected pool.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let jwt = JwtKeys::new(&config.jwt_secret, config.token_ttl_hours);
        Self {
            inner: Arc::new(AppStateInner { config, pool, jwt }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn jwt(&self) -> &JwtKeys {
        &self.inner.jwt
    }
}
