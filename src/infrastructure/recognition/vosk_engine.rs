use std::path::{Path, PathBuf};

use vosk::{DecodingState, Model, Recognizer};

use crate::application::ports::{RecognitionEngine, RecognitionError, RecognizerSession};

/// Kaldi-based Vosk model. Requires `libvosk` at link time.
pub struct VoskEngine {
    model: Model,
    model_path: PathBuf,
}

impl VoskEngine {
    pub fn load(model_path: &Path) -> Result<Self, RecognitionError> {
        tracing::info!(
            model_path = %model_path.display(),
            "Loading Vosk recognition model"
        );

        let model = Model::new(model_path.to_string_lossy()).ok_or_else(|| {
            RecognitionError::ModelLoadFailed(format!(
                "missing or corrupt vosk model at {}",
                model_path.display()
            ))
        })?;

        tracing::info!("Vosk recognition model loaded");

        Ok(Self {
            model,
            model_path: model_path.to_path_buf(),
        })
    }
}

impl RecognitionEngine for VoskEngine {
    fn create_session(
        &self,
        sample_rate: u32,
    ) -> Result<Box<dyn RecognizerSession + '_>, RecognitionError> {
        let recognizer = Recognizer::new(&self.model, sample_rate as f32).ok_or_else(|| {
            RecognitionError::SessionFailed(format!(
                "vosk rejected recognizer at {} Hz",
                sample_rate
            ))
        })?;

        Ok(Box::new(VoskSession {
            recognizer,
            samples: Vec::new(),
            carry: None,
        }))
    }
}

impl Drop for VoskEngine {
    fn drop(&mut self) {
        tracing::info!(
            model_path = %self.model_path.display(),
            "Vosk recognition model released"
        );
    }
}

struct VoskSession {
    recognizer: Recognizer,
    samples: Vec<i16>,
    carry: Option<u8>,
}

impl RecognizerSession for VoskSession {
    fn accept_waveform(&mut self, pcm: &[u8]) -> Result<bool, RecognitionError> {
        self.samples.clear();

        let mut bytes = pcm;
        if let Some(low) = self.carry.take() {
            let Some((&high, rest)) = bytes.split_first() else {
                self.carry = Some(low);
                return Ok(false);
            };
            self.samples.push(i16::from_le_bytes([low, high]));
            bytes = rest;
        }

        let mut pairs = bytes.chunks_exact(2);
        self.samples
            .extend((&mut pairs).map(|pair| i16::from_le_bytes([pair[0], pair[1]])));
        self.carry = pairs.remainder().first().copied();

        match self.recognizer.accept_waveform(&self.samples) {
            Ok(DecodingState::Finalized) => Ok(true),
            Ok(_) => Ok(false),
            Err(e) => Err(RecognitionError::RecognitionFailed(format!("{:?}", e))),
        }
    }

    fn final_result(mut self: Box<Self>) -> Result<String, RecognitionError> {
        let result = self.recognizer.final_result();
        let text = result
            .single()
            .map(|single| single.text.to_string())
            .ok_or_else(|| {
                RecognitionError::RecognitionFailed("expected a single final result".to_string())
            })?;

        Ok(serde_json::json!({ "text": text }).to_string())
    }
}
