use std::path::Path;

use tolk::application::ports::{RecognitionEngine, RecognitionError};
use tolk::infrastructure::recognition::{
    MockRecognitionEngine, RecognitionEngineFactory, RecognitionProvider, WhisperEngine,
};

#[test]
fn given_missing_model_directory_when_loading_whisper_then_returns_load_error() {
    let result = WhisperEngine::load(Path::new("/nonexistent/whisper-model"));

    assert!(matches!(result, Err(RecognitionError::ModelLoadFailed(_))));
}

#[test]
fn given_directory_without_model_files_when_loading_whisper_then_returns_load_error() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.json"), "{ not json").unwrap();

    let result = WhisperEngine::load(dir.path());

    assert!(matches!(result, Err(RecognitionError::ModelLoadFailed(_))));
}

#[test]
fn given_mock_provider_when_creating_engine_then_sessions_emit_json_payload() {
    let engine = RecognitionEngineFactory::create(RecognitionProvider::Mock, Path::new("/unused"))
        .unwrap();

    let mut session = engine.create_session(16_000).unwrap();
    session.accept_waveform(&[0, 0, 1, 0]).unwrap();
    let payload = session.final_result().unwrap();

    let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert!(!json["text"].as_str().unwrap().is_empty());
}

#[cfg(not(feature = "vosk"))]
#[test]
fn given_vosk_provider_without_feature_when_creating_engine_then_returns_load_error() {
    let result = RecognitionEngineFactory::create(RecognitionProvider::Vosk, Path::new("/models"));

    assert!(matches!(result, Err(RecognitionError::ModelLoadFailed(_))));
}

#[test]
fn given_mock_engine_when_opening_sessions_then_counts_them_independently() {
    let engine = MockRecognitionEngine::new("abc");

    let first = engine.create_session(16_000).unwrap();
    let mut second = engine.create_session(16_000).unwrap();
    second.accept_waveform(&[1, 2, 3, 4, 5, 6]).unwrap();

    assert_eq!(engine.sessions_created(), 2);
    assert_eq!(engine.bytes_received(), 6);
    assert_eq!(first.final_result().unwrap(), r#"{"text":"abc"}"#);
}
