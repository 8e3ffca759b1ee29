//! Text-to-vector embedding pipeline.
//!
//! Provides the [`TextEncoder`] trait and a local ONNX Runtime implementation
//! ([`OnnxEncoder`]) for BERT-family sentence-embedding models such as
//! intfloat/e5-base-v2. Encoders produce L2-normalized vectors of a fixed
//! dimensionality discovered when the model is loaded.

pub mod onnx;

pub use onnx::OnnxEncoder;

use anyhow::Result;

/// Trait for encoding text into an embedding vector.
///
/// Implementations produce L2-normalized vectors of exactly
/// [`dimension`](TextEncoder::dimension) floats, and the same input always
/// produces the same vector. All methods are synchronous — callers in async
/// contexts should use `tokio::task::spawn_blocking`.
pub trait TextEncoder: Send + Sync {
    /// Encode a single text string into a vector.
    ///
    /// The empty string is valid input: it tokenizes to special tokens only
    /// and encodes like any other text.
    fn encode(&self, text: &str) -> Result<Vec<f32>>;

    /// Number of dimensions in every vector this encoder produces.
    fn dimension(&self) -> usize;

    /// Identifier of the loaded model, for logs and the health endpoint.
    fn model_name(&self) -> &str;
}
