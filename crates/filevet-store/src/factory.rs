//! Status store construction from configuration.

use std::sync::Arc;

use filevet_core::{AppError, Config, StoreBackend};

use crate::memory::InMemoryStatusStore;
use crate::postgres::PgStatusStore;
use crate::traits::StatusStore;

/// Create a status store based on configuration. The PostgreSQL backend runs
/// its migrations before being handed out.
pub async fn create_status_store(config: &Config) -> Result<Arc<dyn StatusStore>, AppError> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| AppError::Config("DATABASE_URL not configured".to_string()))?;
            let pool = sqlx::PgPool::connect(url).await?;
            let store = PgStatusStore::new(pool);
            store.migrate().await?;
            tracing::info!("Status store backend: postgres");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::info!("Status store backend: memory");
            Ok(Arc::new(InMemoryStatusStore::new()))
        }
    }
}
