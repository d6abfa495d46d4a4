use config_engine::WardCareConfig;
use database_layer::{DatabasePool, InMemoryStore, PgStore, WardStore};
use error_common::{Result, WardCareError};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use ward_service::WardCoordinator;

/// Shared handler state
#[derive(Clone)]
pub struct WardServer {
    pub coordinator: WardCoordinator,
    pub persistent: bool,
    started_at: Instant,
}

impl WardServer {
    /// Open the configured store and load the application state.
    ///
    /// Without `database.url` the server runs on the in-memory store.
    pub async fn new(config: &WardCareConfig) -> Result<Self> {
        let (store, persistent): (Arc<dyn WardStore>, bool) = match &config.database.url {
            Some(url) => {
                let pool = DatabasePool::new(url, config.database.max_connections)
                    .await
                    .map_err(|e| WardCareError::DatabaseError(e.to_string()))?;
                pool.migrate()
                    .await
                    .map_err(|e| WardCareError::DatabaseError(e.to_string()))?;
                info!(max_connections = config.database.max_connections, "PostgreSQL store ready");
                (Arc::new(PgStore::new(pool)), true)
            }
            None => {
                warn!("No database.url configured, data will not survive a restart");
                (Arc::new(InMemoryStore::new()), false)
            }
        };

        Self::with_store(store, persistent, config).await
    }

    /// Build the server over an existing store
    pub async fn with_store(store: Arc<dyn WardStore>, persistent: bool, config: &WardCareConfig) -> Result<Self> {
        let coordinator = WardCoordinator::start(store, config)
            .await
            .map_err(|e| WardCareError::DatabaseError(e.to_string()))?;
        Ok(Self {
            coordinator,
            persistent,
            started_at: Instant::now(),
        })
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
