//! HTTP surface: routes, shared state, and the error contract.
//!
//! [`router`] builds the axum application: `POST /embed` for inference,
//! `GET /health` for operational checks, and JSON fallbacks for unknown
//! paths and methods so every failure leaves the process in the same
//! [`ErrorResponse`] body shape.

pub mod embed;
pub mod health;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::sync::Semaphore;

use crate::config::VeccerConfig;
use crate::embedding::TextEncoder;

/// Shared per-process state handed to every handler.
///
/// The encoder is loaded once at startup and never mutated afterward. The
/// semaphore bounds how many encodes may occupy blocking workers at a time.
#[derive(Clone)]
pub struct AppState {
    pub encoder: Arc<dyn TextEncoder>,
    pub encode_permits: Arc<Semaphore>,
    pub max_text_chars: usize,
}

impl AppState {
    pub fn new(encoder: Arc<dyn TextEncoder>, config: &VeccerConfig) -> Self {
        Self {
            encoder,
            encode_permits: Arc::new(Semaphore::new(
                config.limits.max_concurrent_encodes.max(1),
            )),
            max_text_chars: config.limits.max_text_chars,
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/embed", post(embed::embed).fallback(method_not_allowed))
        .route("/health", get(health::health).fallback(method_not_allowed))
        .fallback(not_found)
        .with_state(state)
}

/// Per-request error taxonomy for the HTTP boundary.
///
/// Initialization failures are deliberately not represented here: they abort
/// startup before the listener binds (see `server::serve`).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body does not match the schema. Rejected without ever
    /// touching the model.
    #[error("{message}")]
    Validation {
        field: Option<&'static str>,
        message: String,
    },

    /// The model failed to produce a vector for an accepted input.
    #[error("{0}")]
    Inference(String),

    /// No route matches the request path.
    #[error("no route matches {0}")]
    NotFound(String),

    /// The path exists but not for this method.
    #[error("{0}")]
    MethodNotAllowed(String),
}

impl ApiError {
    /// Map a body-extraction rejection to a validation error. Deserialization
    /// failures name the `text` field; syntax and content-type problems are
    /// not about any one field.
    fn from_rejection(rejection: JsonRejection) -> Self {
        let field = match &rejection {
            JsonRejection::JsonDataError(_) => Some("text"),
            _ => None,
        };
        ApiError::Validation {
            field,
            message: rejection.body_text(),
        }
    }

    /// Stable machine-readable kind, sent as the `error` field on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "invalid_request",
            ApiError::Inference(_) => "encode_failed",
            ApiError::NotFound(_) => "not_found",
            ApiError::MethodNotAllowed(_) => "method_not_allowed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Build the wire response, tagging it with the request id when the
    /// caller has one.
    pub fn to_response(&self, request_id: Option<String>) -> (StatusCode, Json<ErrorResponse>) {
        let field = match self {
            ApiError::Validation { field, .. } => *field,
            _ => None,
        };
        (
            self.status(),
            Json(ErrorResponse {
                error: self.kind(),
                message: self.to_string(),
                field,
                request_id,
            }),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.to_response(None).into_response()
    }
}

/// Wire shape shared by every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

async fn not_found(uri: Uri) -> Response {
    ApiError::NotFound(uri.path().to_string()).into_response()
}

async fn method_not_allowed(method: Method, uri: Uri) -> Response {
    ApiError::MethodNotAllowed(format!("{method} is not supported for {}", uri.path()))
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_statuses_match_their_class() {
        let validation = ApiError::Validation {
            field: Some("text"),
            message: "missing field".into(),
        };
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(validation.kind(), "invalid_request");

        let inference = ApiError::Inference("session exploded".into());
        assert_eq!(inference.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(inference.kind(), "encode_failed");

        let not_found = ApiError::NotFound("/nope".into());
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.kind(), "not_found");

        let method = ApiError::MethodNotAllowed("GET is not supported for /embed".into());
        assert_eq!(method.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(method.kind(), "method_not_allowed");
    }

    #[test]
    fn error_body_omits_absent_optional_fields() {
        let (_, Json(body)) = ApiError::NotFound("/nope".into()).to_response(None);
        let value = serde_json::to_value(&body).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj["error"], "not_found");
        assert!(obj.contains_key("message"));
        assert!(!obj.contains_key("field"));
        assert!(!obj.contains_key("request_id"));
    }

    #[test]
    fn error_body_carries_field_and_request_id_when_present() {
        let err = ApiError::Validation {
            field: Some("text"),
            message: "expected a string".into(),
        };
        let (status, Json(body)) = err.to_response(Some("req-123".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["field"], "text");
        assert_eq!(value["request_id"], "req-123");
    }
}
