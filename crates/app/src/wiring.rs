use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::{AppConfig, StorageKind};
use crate::services::Services;
use crate::state::AppState;
use remark_infra::db::{connect_lazy, DbPoolError};
use remark_infra::notify::CommentHub;
use remark_infra::storage::{MemoryStorage, PostgresStorage, StorageBackend};

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("db error: {0}")]
    Db(#[from] DbPoolError),
    #[error("REMARK_DATABASE_URL is required for the postgres backend")]
    MissingDatabaseUrl,
}

pub fn build_state(config: AppConfig) -> Result<AppState, WiringError> {
    let storage = build_storage(&config)?;
    info!(backend = storage.name(), "storage selected");
    let storage = Arc::new(storage);
    let hub = CommentHub::new(config.subscriber_buffer);
    let services = Services::new(storage.clone(), hub.clone());
    Ok(AppState {
        config: Arc::new(config),
        storage,
        hub,
        services: Arc::new(services),
        shutdown: CancellationToken::new(),
    })
}

fn build_storage(config: &AppConfig) -> Result<StorageBackend, WiringError> {
    match config.storage {
        StorageKind::Memory => Ok(StorageBackend::Memory(MemoryStorage::new())),
        StorageKind::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or(WiringError::MissingDatabaseUrl)?;
            let pool = connect_lazy(url, config.db_max_connections)?;
            Ok(StorageBackend::Postgres(PostgresStorage::new(pool)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[tokio::test]
    async fn memory_config_builds_memory_backend() {
        let state = build_state(test_config()).unwrap();
        assert_eq!(state.storage.name(), "memory");
        assert!(state.storage.pool().is_none());
        assert!(!state.shutdown.is_cancelled());
    }

    #[test]
    fn postgres_without_url_is_rejected() {
        let mut config = test_config();
        config.storage = StorageKind::Postgres;
        assert!(matches!(
            build_state(config),
            Err(WiringError::MissingDatabaseUrl)
        ));
    }

    #[tokio::test]
    async fn postgres_pool_is_lazy() {
        let mut config = test_config();
        config.storage = StorageKind::Postgres;
        config.database_url = Some("postgres://remark@127.0.0.1:1/remark".to_string());
        let state = build_state(config).unwrap();
        assert_eq!(state.storage.name(), "postgres");
        assert!(state.storage.pool().is_some());
    }
}
