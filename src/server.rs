//! HTTP server lifecycle: load the model, bind, serve, shut down.
//!
//! Startup order is deliberate: the encoder loads (and probe-validates)
//! before the socket binds, so a model that cannot load means the process
//! exits non-zero without ever accepting a connection.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::{self, AppState};
use crate::config::VeccerConfig;
use crate::embedding::{OnnxEncoder, TextEncoder};

/// Load the encoder, build the router, and serve until ctrl-c.
pub async fn serve(config: VeccerConfig) -> Result<()> {
    // Step 1: Model first — fatal if it cannot load. The listener must never
    // accept a request without a working encoder behind it.
    let encoder = OnnxEncoder::load(&config.model)
        .with_context(|| format!("failed to initialize embedding model {}", config.model.name))?;
    let encoder: Arc<dyn TextEncoder> = Arc::new(encoder);

    // Step 2: Shared state and routes.
    let state = AppState::new(Arc::clone(&encoder), &config);
    let app = api::router(state);

    // Step 3: Bind and serve.
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!(
        addr = %bind_addr,
        model = %encoder.model_name(),
        dimension = encoder.dimension(),
        max_concurrent_encodes = config.limits.max_concurrent_encodes,
        "veccer listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to listen for ctrl-c");
            tracing::info!("shutting down");
        })
        .await?;

    tracing::info!("server stopped");
    Ok(())
}
