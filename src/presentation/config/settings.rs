use std::path::PathBuf;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use super::Environment;
use crate::infrastructure::recognition::RecognitionProvider;

/// Environment variable that points at the on-disk model directory.
pub const MODEL_PATH_ENV: &str = "VOSK_MODEL_PATH";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub recognition: RecognitionSettings,
    pub normalizer: NormalizerSettings,
    pub upload: UploadSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionSettings {
    pub provider: RecognitionProvider,
    #[serde(default)]
    pub model_path: Option<PathBuf>,
}

impl RecognitionSettings {
    /// The configured model directory, or the provider's own default.
    pub fn resolved_model_path(&self) -> PathBuf {
        self.model_path
            .clone()
            .unwrap_or_else(|| self.provider.default_model_path())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NormalizerSettings {
    pub binary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    pub max_file_size_mb: usize,
}

impl UploadSettings {
    pub fn max_bytes(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Settings {
    /// Layers built-in defaults, `appsettings.<env>.toml`, `APP_*` variables
    /// (`__` separates sections) and finally `VOSK_MODEL_PATH`.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default(
                "recognition.provider",
                RecognitionProvider::default().to_string(),
            )?
            .set_default("normalizer.binary", "ffmpeg")?
            .set_default("upload.max_file_size_mb", 50)?
            .set_default("logging.level", "info")?
            .set_default("logging.enable_json", false)?
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("recognition.model_path", std::env::var(MODEL_PATH_ENV).ok())?
            .build()?
            .try_deserialize()
    }
}
