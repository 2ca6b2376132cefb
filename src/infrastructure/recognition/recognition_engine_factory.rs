use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::application::ports::{RecognitionEngine, RecognitionError};

use super::mock_recognition_engine::MockRecognitionEngine;
use super::whisper_engine::WhisperEngine;

pub const DEFAULT_WHISPER_MODEL_PATH: &str = "/models/whisper-base.en";
pub const DEFAULT_VOSK_MODEL_PATH: &str = "/models/vosk-model-small-en-us-0.15";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecognitionProvider {
    Whisper,
    Vosk,
    Mock,
}

impl RecognitionProvider {
    /// Model directory used when neither settings nor `VOSK_MODEL_PATH` name one.
    pub fn default_model_path(&self) -> PathBuf {
        match self {
            RecognitionProvider::Vosk => PathBuf::from(DEFAULT_VOSK_MODEL_PATH),
            RecognitionProvider::Whisper | RecognitionProvider::Mock => {
                PathBuf::from(DEFAULT_WHISPER_MODEL_PATH)
            }
        }
    }
}

/// Vosk when it is compiled in, Whisper otherwise.
impl Default for RecognitionProvider {
    fn default() -> Self {
        if cfg!(feature = "vosk") {
            RecognitionProvider::Vosk
        } else {
            RecognitionProvider::Whisper
        }
    }
}

impl fmt::Display for RecognitionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecognitionProvider::Whisper => "whisper",
            RecognitionProvider::Vosk => "vosk",
            RecognitionProvider::Mock => "mock",
        };
        f.write_str(name)
    }
}

pub struct RecognitionEngineFactory;

impl RecognitionEngineFactory {
    /// Loads the model for `provider`. This is slow and blocking; call it once
    /// at startup.
    pub fn create(
        provider: RecognitionProvider,
        model_path: &Path,
    ) -> Result<Arc<dyn RecognitionEngine>, RecognitionError> {
        match provider {
            RecognitionProvider::Whisper => {
                let engine = WhisperEngine::load(model_path)?;
                Ok(Arc::new(engine))
            }
            RecognitionProvider::Vosk => Self::create_vosk(model_path),
            RecognitionProvider::Mock => {
                tracing::warn!("Using mock recognition engine; transcripts are canned");
                Ok(Arc::new(MockRecognitionEngine::default()))
            }
        }
    }

    #[cfg(feature = "vosk")]
    fn create_vosk(model_path: &Path) -> Result<Arc<dyn RecognitionEngine>, RecognitionError> {
        let engine = super::vosk_engine::VoskEngine::load(model_path)?;
        Ok(Arc::new(engine))
    }

    #[cfg(not(feature = "vosk"))]
    fn create_vosk(_model_path: &Path) -> Result<Arc<dyn RecognitionEngine>, RecognitionError> {
        Err(RecognitionError::ModelLoadFailed(
            "vosk support not compiled in, rebuild with --features vosk".to_string(),
        ))
    }
}
