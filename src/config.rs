use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct VeccerConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_concurrent_encodes: usize,
    pub max_text_chars: usize,
}

impl Default for VeccerConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            model: ModelConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5005,
            log_level: "info".into(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        let dir = default_veccer_dir()
            .join("models")
            .join("e5-base-v2")
            .to_string_lossy()
            .into_owned();
        Self {
            name: "intfloat/e5-base-v2".into(),
            dir,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_encodes: 2,
            // 0 disables the length check; the tokenizer truncates anyway.
            max_text_chars: 0,
        }
    }
}

/// Returns `~/.veccer/`
pub fn default_veccer_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".veccer")
}

/// Returns the default config file path: `~/.veccer/config.toml`
pub fn default_config_path() -> PathBuf {
    default_veccer_dir().join("config.toml")
}

impl VeccerConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            VeccerConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (VECCER_HOST, VECCER_PORT,
    /// VECCER_MODEL_DIR, VECCER_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from a lookup. Tests inject values here instead of
    /// mutating the process environment.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("VECCER_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("VECCER_PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("ignoring VECCER_PORT={val}: not a valid port"),
            }
        }
        if let Some(val) = lookup("VECCER_MODEL_DIR") {
            self.model.dir = val;
        }
        if let Some(val) = lookup("VECCER_LOG_LEVEL") {
            self.server.log_level = val;
        }
    }

    /// Resolve the model directory, expanding `~` if needed.
    pub fn resolved_model_dir(&self) -> PathBuf {
        expand_tilde(&self.model.dir)
    }

    /// The `host:port` string the listener binds.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
