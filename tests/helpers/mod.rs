#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt; // for `oneshot`

use veccer::api::{router, AppState};
use veccer::config::VeccerConfig;
use veccer::embedding::TextEncoder;

/// Dimension used by the stub encoder. Small on purpose — endpoint tests
/// exercise the HTTP contract, not the model.
pub const STUB_DIM: usize = 8;

/// Deterministic stand-in encoder. Produces a text-dependent vector so tests
/// can prove a response came from the text that was actually sent, and counts
/// calls so validation tests can prove the model was never invoked.
pub struct StubEncoder {
    dimension: usize,
    pub calls: AtomicUsize,
}

impl StubEncoder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextEncoder for StubEncoder {
    fn encode(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(stub_vector(text, self.dimension))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }
}

/// Encoder that always fails, for exercising the 500 path.
pub struct FailingEncoder;

impl TextEncoder for FailingEncoder {
    fn encode(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        anyhow::bail!("tokenization failed: synthetic failure")
    }

    fn dimension(&self) -> usize {
        STUB_DIM
    }

    fn model_name(&self) -> &str {
        "failing-model"
    }
}

/// The vector [`StubEncoder`] produces for `text`: length in slot 0, byte sum
/// in slot 1, zeros elsewhere. Integer-valued on purpose so values survive
/// the JSON round trip exactly.
pub fn stub_vector(text: &str, dimension: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; dimension];
    if dimension > 0 {
        v[0] = text.len() as f32;
    }
    if dimension > 1 {
        v[1] = text.bytes().map(u32::from).sum::<u32>() as f32;
    }
    v
}

/// Router over a fresh stub encoder. Returns the encoder too so tests can
/// inspect the call count.
pub fn stub_router() -> (Router, Arc<StubEncoder>) {
    let encoder = Arc::new(StubEncoder::new(STUB_DIM));
    let app = router_with_config(encoder.clone(), &VeccerConfig::default());
    (app, encoder)
}

/// Router with a custom `max_text_chars` limit.
pub fn stub_router_with_limit(max_text_chars: usize) -> (Router, Arc<StubEncoder>) {
    let encoder = Arc::new(StubEncoder::new(STUB_DIM));
    let mut config = VeccerConfig::default();
    config.limits.max_text_chars = max_text_chars;
    let app = router_with_config(encoder.clone(), &config);
    (app, encoder)
}

/// Build the application router around any encoder.
pub fn router_with_config(encoder: Arc<dyn TextEncoder>, config: &VeccerConfig) -> Router {
    router(AppState::new(encoder, config))
}

/// Fire one request at the router and return (status, parsed JSON body).
pub async fn send(
    app: Router,
    method: &str,
    path: &str,
    body: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Convenience wrapper for `POST /embed`.
pub async fn post_embed(app: Router, body: &str) -> (StatusCode, Value) {
    send(app, "POST", "/embed", Some(body)).await
}
