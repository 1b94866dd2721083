use crate::audio::{CaptureBackend, ToneBackend, WavFileBackend, CHUNK_SIZE};
use anyhow::{bail, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub capture: CaptureConfig,
    pub recordings: RecordingsConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct CaptureConfig {
    /// "tone" or "file"
    pub source: String,
    #[serde(default = "default_tone_hz")]
    pub tone_hz: f64,
    /// Input for the "file" source
    pub file_path: Option<String>,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct RecordingsConfig {
    pub output_dir: String,
}

fn default_tone_hz() -> f64 {
    440.0
}

fn default_chunk_size() -> usize {
    CHUNK_SIZE
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("SESSION_RECORDER").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl CaptureConfig {
    /// Build the capture backend this config names
    pub fn backend(&self) -> Result<Arc<dyn CaptureBackend>> {
        match self.source.as_str() {
            "tone" => Ok(Arc::new(ToneBackend::new(self.tone_hz))),
            "file" => match &self.file_path {
                Some(path) => Ok(Arc::new(WavFileBackend::new(path))),
                None => bail!("capture.source = \"file\" requires capture.file_path"),
            },
            other => bail!("Unknown capture source: {} (expected \"tone\" or \"file\")", other),
        }
    }
}

impl RecordingsConfig {
    /// Relative paths land under `output_dir`; absolute paths are kept
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        Path::new(&self.output_dir).join(path)
    }
}
