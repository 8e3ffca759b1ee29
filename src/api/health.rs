//! `GET /health` — liveness and model identity for operational tooling.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: String,
    pub dimension: usize,
}

/// Reports "ok" with the loaded model's identity. The model loads before the
/// listener binds, so a reachable endpoint implies a usable encoder.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.encoder.model_name().to_string(),
        dimension: state.encoder.dimension(),
    })
}
