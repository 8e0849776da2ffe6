use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub modules: HealthModules,
}

#[derive(Debug, Serialize)]
pub struct HealthModules {
    pub storage: StorageStatus,
    pub stream: StreamStatus,
}

#[derive(Debug, Serialize)]
pub struct StorageStatus {
    pub backend: &'static str,
    pub database_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct StreamStatus {
    pub subscribers: usize,
    pub shutting_down: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let subscribers = state.hub.total_subscribers().await;
    Json(HealthResponse {
        status: "ok",
        modules: HealthModules {
            storage: StorageStatus {
                backend: state.storage.name(),
                database_configured: state.storage.pool().is_some(),
            },
            stream: StreamStatus {
                subscribers,
                shutting_down: state.shutdown.is_cancelled(),
            },
        },
    })
}
