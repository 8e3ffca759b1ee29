//! CLI `check` command — verify configuration and model artifacts and print
//! a preflight report without binding the listener.

use anyhow::Result;

use crate::config::VeccerConfig;
use crate::embedding::{OnnxEncoder, TextEncoder};

/// Check that the model artifacts exist and the encoder loads, then print a
/// report. Exits non-zero (via the returned error) when the service could
/// not start.
pub fn check(config: &VeccerConfig) -> Result<()> {
    let model_dir = config.resolved_model_dir();
    let model_path = model_dir.join("model.onnx");
    let tokenizer_path = model_dir.join("tokenizer.json");

    println!("Veccer Preflight");
    println!("================");
    println!();
    println!("Model:             {}", config.model.name);
    println!("Model directory:   {}", model_dir.display());
    println!("  model.onnx:      {}", artifact_status(&model_path));
    println!("  tokenizer.json:  {}", artifact_status(&tokenizer_path));
    println!();

    if !model_path.exists() || !tokenizer_path.exists() {
        println!("Missing artifacts. Export {} to ONNX and place", config.model.name);
        println!("model.onnx and tokenizer.json in the directory above");
        println!("(VECCER_MODEL_DIR overrides it).");
        anyhow::bail!("model artifacts missing from {}", model_dir.display());
    }

    let encoder = OnnxEncoder::load(&config.model)?;
    println!("Probe inference:   OK");
    println!("Dimension:         {}", encoder.dimension());
    println!();
    println!("Listen address:    {}", config.bind_addr());
    println!("Encode slots:      {}", config.limits.max_concurrent_encodes);
    if config.limits.max_text_chars > 0 {
        println!("Max text length:   {} chars", config.limits.max_text_chars);
    } else {
        println!("Max text length:   unlimited");
    }
    println!();
    println!("Ready to serve.");

    Ok(())
}

fn artifact_status(path: &std::path::Path) -> String {
    match std::fs::metadata(path) {
        Ok(meta) => format!("found ({})", format_bytes(meta.len())),
        Err(_) => "MISSING".into(),
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
