use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RecognizeError, Result};
use crate::preprocess::Normalization;

/// Environment variable overriding `model_path`.
pub const ENV_MODEL: &str = "FERRITE_DIGITS_MODEL";
/// Environment variable overriding `server.addr`.
pub const ENV_ADDR: &str = "FERRITE_DIGITS_ADDR";

/// HTTP settings for the prediction server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    /// Value of `Access-Control-Allow-Origin` on every API response.
    pub allow_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { addr: "127.0.0.1:7878".into(), allow_origin: "*".into() }
    }
}

/// Everything needed to stand up a recognizer.
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Model artifact; `.onnx` selects the ONNX backend, anything else the
    /// dense JSON network.
    pub model_path: PathBuf,
    pub normalization: Normalization,
    pub server: ServerConfig,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        RecognizerConfig {
            model_path: PathBuf::from("models/mnist.json"),
            normalization: Normalization::default(),
            server: ServerConfig::default(),
        }
    }
}

impl RecognizerConfig {
    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .map_err(|e| RecognizeError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), self)
            .map_err(|e| RecognizeError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Reads a config written by `save_json` (or by hand) and validates it.
    pub fn load_json(path: &Path) -> Result<RecognizerConfig> {
        let file = std::fs::File::open(path)
            .map_err(|e| RecognizeError::Config(format!("{}: {}", path.display(), e)))?;
        let config: RecognizerConfig = serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| RecognizeError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `FERRITE_DIGITS_MODEL` / `FERRITE_DIGITS_ADDR` when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.is_empty()) {
            self.model_path = PathBuf::from(model);
        }
        if let Some(addr) = lookup(ENV_ADDR).filter(|v| !v.is_empty()) {
            self.server.addr = addr;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let std = self.normalization.std;
        if !std.is_finite() || std <= 0.0 {
            return Err(RecognizeError::Config(format!(
                "normalization.std must be a positive number, got {}", std
            )));
        }
        if !self.normalization.mean.is_finite() {
            return Err(RecognizeError::Config("normalization.mean must be finite".into()));
        }
        Ok(())
    }
}
