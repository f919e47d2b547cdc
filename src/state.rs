//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It is built once at startup: one pool, one bookmark store, one identity
//! gateway. Handlers never construct their own clients.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::services::bookmarks::{BookmarkStore, PgBookmarkStore};
use crate::services::session::{IdentityGateway, PgIdentity};

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub store: Arc<dyn BookmarkStore>,
    pub identity: Arc<dyn IdentityGateway>,
}

impl AppState {
    /// Wire the Postgres-backed store and identity gateway onto `pool`.
    #[must_use]
    pub fn new(pool: PgPool, config: Config) -> Self {
        let store = Arc::new(PgBookmarkStore::new(pool.clone()));
        let identity = Arc::new(PgIdentity::new(pool.clone(), config.session_ttl_days));
        Self::with_services(pool, config, store, identity)
    }

    #[must_use]
    pub fn with_services(
        pool: PgPool,
        config: Config,
        store: Arc<dyn BookmarkStore>,
        identity: Arc<dyn IdentityGateway>,
    ) -> Self {
        Self { pool, config: Arc::new(config), store, identity }
    }
}

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
