//! Text embedding inference over HTTP — one model, one endpoint.
//!
//! Veccer loads a single pretrained sentence-embedding model (the ONNX
//! export of [intfloat/e5-base-v2](https://huggingface.co/intfloat/e5-base-v2)
//! by default) once at startup and serves `POST /embed`: the body
//! `{"text": "..."}` comes back as `{"vector": [...]}` with one float per
//! model dimension (768 for the reference model). Identical input always
//! yields the identical vector.
//!
//! # Architecture
//!
//! - **Embeddings**: Local ONNX Runtime session plus a HuggingFace tokenizer;
//!   attention-masked mean pooling and L2 normalization reproduce the
//!   sentence-transformers pipeline for this model family
//! - **HTTP**: axum router with a uniform JSON error body for every failure
//!   class — 400 validation, 500 encode, 404/405 routing
//! - **Concurrency**: encoding is blocking work offloaded to
//!   `spawn_blocking`, bounded by a semaphore; the single ONNX session sits
//!   behind a mutex, so concurrent requests ultimately serialize around the
//!   model's compute
//! - **Lifecycle**: the model loads and probe-validates before the socket
//!   binds; a load failure exits the process non-zero without serving
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`embedding`] — Text-to-vector embedding pipeline via ONNX Runtime
//! - [`api`] — Routes, request/response schema, and the HTTP error contract

pub mod api;
pub mod config;
pub mod embedding;
