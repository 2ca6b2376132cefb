mod mock_recognition_engine;
mod recognition_engine_factory;
#[cfg(feature = "vosk")]
mod vosk_engine;
mod whisper_engine;

pub use mock_recognition_engine::MockRecognitionEngine;
pub use recognition_engine_factory::{
    DEFAULT_VOSK_MODEL_PATH, DEFAULT_WHISPER_MODEL_PATH, RecognitionEngineFactory,
    RecognitionProvider,
};
#[cfg(feature = "vosk")]
pub use vosk_engine::VoskEngine;
pub use whisper_engine::WhisperEngine;
