use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::services::Services;
use remark_infra::notify::CommentHub;
use remark_infra::storage::StorageBackend;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: Arc<StorageBackend>,
    pub hub: CommentHub,
    pub services: Arc<Services<StorageBackend>>,
    /// Cancelled on shutdown; parent of every live comment stream.
    pub shutdown: CancellationToken,
}
