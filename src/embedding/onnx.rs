//! Local ONNX Runtime encoder.
//!
//! Implements [`TextEncoder`] for BERT-family sentence-embedding models
//! exported to ONNX (intfloat/e5-base-v2 by default). Handles tokenization,
//! inference, mean pooling, and L2 normalization — the same pipeline
//! sentence-transformers applies for this model family, so vectors match the
//! reference implementation.

use std::sync::Mutex;

use anyhow::{Context, Result};
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;

use super::TextEncoder;
use crate::config::ModelConfig;

/// Maximum sequence length for e5-base-v2 (trained at 512). Longer inputs are
/// truncated by the tokenizer.
const MAX_SEQ_LEN: usize = 512;

/// Local ONNX-based text encoder.
///
/// The session is loaded once; a probe inference at load time pins the output
/// dimensionality for the life of the process.
#[derive(Debug)]
pub struct OnnxEncoder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    model_name: String,
    dimension: usize,
}

// Safety: Tokenizer is Send+Sync. Session is behind a Mutex.
// The Mutex guarantees exclusive access during run().
unsafe impl Send for OnnxEncoder {}
unsafe impl Sync for OnnxEncoder {}

impl OnnxEncoder {
    /// Load the model and tokenizer from `config.dir`, then run a probe
    /// inference to discover the output dimensionality and prove the model
    /// can actually encode before any request is accepted.
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let model_dir = crate::config::expand_tilde(&config.dir);
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(
            model_path.exists(),
            "ONNX model not found at {}. Place the ONNX export of {} there \
             (VECCER_MODEL_DIR overrides the directory).",
            model_path.display(),
            config.name
        );
        anyhow::ensure!(
            tokenizer_path.exists(),
            "Tokenizer not found at {}. Place tokenizer.json for {} there.",
            tokenizer_path.display(),
            config.name
        );

        let session = Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(&model_path)
            .context("failed to load ONNX model")?;

        tracing::info!(model = %model_path.display(), "ONNX model loaded");

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("failed to load tokenizer: {e}"))?;

        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("failed to set truncation: {e}"))?;

        tracing::info!(tokenizer = %tokenizer_path.display(), "tokenizer loaded");

        let mut encoder = Self {
            session: Mutex::new(session),
            tokenizer,
            model_name: config.name.clone(),
            dimension: 0,
        };

        let probe = encoder.run_model("dimension probe")?;
        anyhow::ensure!(
            !probe.is_empty(),
            "probe inference produced an empty vector"
        );
        encoder.dimension = probe.len();

        tracing::info!(
            model = %encoder.model_name,
            dimension = encoder.dimension,
            "encoder ready"
        );

        Ok(encoder)
    }

    /// Tokenize, run the session, pool, and normalize. Does not check the
    /// result length — [`TextEncoder::encode`] does that once the probe has
    /// pinned the dimensionality.
    fn run_model(&self, text: &str) -> Result<Vec<f32>> {
        // Step 1: Tokenize (adds CLS/SEP, so even "" yields a nonzero sequence)
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("tokenization failed: {e}"))?;

        let seq_len = encoding.get_ids().len();
        anyhow::ensure!(seq_len > 0, "tokenizer produced an empty sequence");

        // Step 2: Build input tensors as i64
        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();

        let shape = vec![1i64, seq_len as i64];
        let input_ids_tensor = Tensor::from_array((shape.clone(), input_ids.into_boxed_slice()))?;
        let attention_mask_tensor =
            Tensor::from_array((shape.clone(), attention_mask.clone().into_boxed_slice()))?;
        // token_type_ids: all zeros (single sentence, no segment B)
        let token_type_ids = vec![0i64; seq_len];
        let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids.into_boxed_slice()))?;

        // Step 3: Run ONNX inference
        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("session lock poisoned: {e}"))?;

        let outputs = session.run(ort::inputs! {
            "input_ids" => input_ids_tensor,
            "attention_mask" => attention_mask_tensor,
            "token_type_ids" => token_type_ids_tensor,
        })?;

        // Step 4: Extract token embeddings — shape [1, seq_len, hidden]
        // The output name varies by ONNX export. Try common names, fall back to index 0.
        let token_emb_value = outputs
            .get("last_hidden_state")
            .or_else(|| outputs.get("token_embeddings"))
            .unwrap_or_else(|| &outputs[0]);

        let (out_shape, data) = token_emb_value
            .try_extract_tensor::<f32>()
            .context("failed to extract token embeddings tensor")?;

        let dims: &[i64] = &out_shape;
        anyhow::ensure!(
            dims.len() == 3 && dims[0] == 1,
            "unexpected token embeddings shape: {dims:?}, expected [1, seq, hidden]"
        );
        let actual_seq_len = dims[1] as usize;
        let hidden_dim = dims[2] as usize;

        // Step 5: Mean pooling with attention mask, then L2 normalize
        let pooled = mean_pool(data, &attention_mask, actual_seq_len, hidden_dim);
        Ok(l2_normalize(&pooled))
    }
}

impl TextEncoder for OnnxEncoder {
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.run_model(text)?;
        anyhow::ensure!(
            vector.len() == self.dimension,
            "model produced {} dimensions, expected {}",
            vector.len(),
            self.dimension
        );
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Attention-masked mean pooling over token embeddings laid out row-major as
/// `[seq_len, hidden_dim]`. Padding positions (mask 0) contribute nothing.
fn mean_pool(data: &[f32], attention_mask: &[i64], seq_len: usize, hidden_dim: usize) -> Vec<f32> {
    let mut sum = vec![0.0f32; hidden_dim];
    let mut count = 0.0f32;

    for s in 0..seq_len {
        let mask = attention_mask.get(s).copied().unwrap_or(0) as f32;
        if mask > 0.0 {
            let offset = s * hidden_dim;
            for d in 0..hidden_dim {
                sum[d] += data[offset + d] * mask;
            }
            count += mask;
        }
    }

    if count > 0.0 {
        for d in 0..hidden_dim {
            sum[d] /= count;
        }
    }

    sum
}

/// L2-normalize a vector. Returns a zero vector if the input norm is zero.
fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}
