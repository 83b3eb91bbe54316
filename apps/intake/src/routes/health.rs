use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::state::AppState;
use crate::structuring::prompts::HEALTH_SAMPLE_RESUME;
use crate::structuring::PROFILE_KEYS;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME")
    }))
}

/// GET /health/llm
/// Structures a fixed sample resume and checks the result carries every profile key.
pub async fn llm_health_handler(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let profile = state.structurer.structure(HEALTH_SAMPLE_RESUME).await?;
    let result = serde_json::to_value(&profile).map_err(anyhow::Error::from)?;
    let complete = PROFILE_KEYS
        .iter()
        .all(|key| result.get(*key).is_some());

    Ok(Json(json!({
        "status": if complete { "ok" } else { "error" },
        "model": state.structurer.model_name(),
        "empty": profile.is_empty(),
        "result": result
    })))
}

/// GET /storage/health
/// Lists buckets to prove the object store is reachable with our credentials.
pub async fn storage_health_handler(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let buckets = state.store.list_buckets().await?;
    Ok(Json(json!({
        "status": "ok",
        "buckets": buckets
    })))
}
