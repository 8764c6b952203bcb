use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::config::BackendConfig;
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and storage backend.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let storage = match state.config.backend {
        BackendConfig::Memory => "memory",
        BackendConfig::Aws { .. } => "postgres",
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "promptstore",
        "storage": storage,
        "cache": state.config.redis_url.is_some(),
    }))
}
