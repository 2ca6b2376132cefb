mod audio_normalizer;
mod recognition_engine;
mod transcription_service;

pub use audio_normalizer::{AudioNormalizer, NormalizeError};
pub use recognition_engine::{RecognitionEngine, RecognitionError, RecognizerSession};
pub use transcription_service::{TranscriptionError, TranscriptionService};
