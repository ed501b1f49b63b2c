use api_types::health::{DatabaseHealth, Health};
use axum::{Json, extract::State};
use chrono::Utc;

use crate::server::ServerState;

/// Liveness check; always answers, reporting whether the store responds.
pub async fn get_health(State(state): State<ServerState>) -> Json<Health> {
    let connected = state.engine.is_store_connected().await;
    Json(Health {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        database: DatabaseHealth { connected },
    })
}
