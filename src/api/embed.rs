//! `POST /embed` — encode one text into one vector.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiError, AppState};

/// Request body: exactly one field. Unknown extra fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedRequest {
    pub text: String,
}

/// Success envelope. `vector` always holds exactly one float per model
/// dimension.
#[derive(Debug, Serialize)]
pub struct EmbedResponse {
    pub vector: Vec<f32>,
}

/// Handler for `POST /embed`.
///
/// Takes the body extraction as a `Result` so schema failures become a 400
/// with our error shape instead of axum's default rejection.
pub async fn embed(
    State(state): State<AppState>,
    payload: Result<Json<EmbedRequest>, JsonRejection>,
) -> Response {
    let request_id = Uuid::now_v7().to_string();
    match run(&state, payload, &request_id).await {
        Ok(vector) => Json(EmbedResponse { vector }).into_response(),
        Err(err) => {
            tracing::warn!(request_id = %request_id, error = %err, kind = err.kind(), "embed request failed");
            err.to_response(Some(request_id)).into_response()
        }
    }
}

async fn run(
    state: &AppState,
    payload: Result<Json<EmbedRequest>, JsonRejection>,
    request_id: &str,
) -> Result<Vec<f32>, ApiError> {
    // Step 1: Validate the body. The model is never invoked for a bad request.
    let Json(request) = payload.map_err(ApiError::from_rejection)?;

    let text_chars = request.text.chars().count();
    if state.max_text_chars > 0 && text_chars > state.max_text_chars {
        return Err(ApiError::Validation {
            field: Some("text"),
            message: format!(
                "text is {text_chars} characters, over the configured limit of {}",
                state.max_text_chars
            ),
        });
    }

    tracing::debug!(request_id = %request_id, text_chars, "embed request accepted");

    // Step 2: Wait for an encode slot. Encoding is blocking, CPU-bound work,
    // so it runs on a spawn_blocking worker; the semaphore keeps the number
    // of in-flight encodes bounded instead of flooding the blocking pool.
    let _permit = state
        .encode_permits
        .acquire()
        .await
        .map_err(|_| ApiError::Inference("encode pool is shut down".into()))?;

    let encoder = Arc::clone(&state.encoder);
    let text = request.text;
    let started = Instant::now();
    let vector = tokio::task::spawn_blocking(move || encoder.encode(&text))
        .await
        .map_err(|e| ApiError::Inference(format!("encode task failed: {e}")))?
        .map_err(|e| ApiError::Inference(format!("{e:#}")))?;

    tracing::info!(
        request_id = %request_id,
        text_chars,
        dimension = vector.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "embed request served"
    );

    Ok(vector)
}
