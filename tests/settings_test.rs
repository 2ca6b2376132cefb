use std::path::PathBuf;

use tolk::infrastructure::observability::TracingConfig;
use tolk::infrastructure::recognition::{
    DEFAULT_VOSK_MODEL_PATH, DEFAULT_WHISPER_MODEL_PATH, RecognitionEngineFactory,
    RecognitionProvider,
};
use tolk::presentation::config::{MODEL_PATH_ENV, RecognitionSettings, UploadSettings};
use tolk::presentation::{Environment, Settings};

#[test]
fn given_environment_names_when_parsing_then_maps_aliases() {
    assert_eq!(Environment::try_from("LOCAL".to_string()), Ok(Environment::Local));
    assert_eq!(Environment::try_from("production".to_string()), Ok(Environment::Prod));
    assert_eq!(Environment::try_from("test".to_string()), Ok(Environment::Test));
    assert!(Environment::try_from("staging".to_string()).is_err());
}

#[test]
fn given_upload_limit_in_mb_when_converting_then_returns_bytes() {
    let upload = UploadSettings {
        max_file_size_mb: 3,
    };

    assert_eq!(upload.max_bytes(), 3 * 1024 * 1024);
}

#[test]
fn given_no_model_path_when_resolving_then_each_provider_gets_its_own_model_dir() {
    let whisper = RecognitionSettings {
        provider: RecognitionProvider::Whisper,
        model_path: None,
    };
    let vosk = RecognitionSettings {
        provider: RecognitionProvider::Vosk,
        model_path: None,
    };

    assert_eq!(whisper.resolved_model_path(), PathBuf::from(DEFAULT_WHISPER_MODEL_PATH));
    assert_eq!(vosk.resolved_model_path(), PathBuf::from(DEFAULT_VOSK_MODEL_PATH));
    assert_ne!(whisper.resolved_model_path(), vosk.resolved_model_path());
}

#[test]
fn given_explicit_model_path_when_resolving_then_wins_over_provider_default() {
    let settings = RecognitionSettings {
        provider: RecognitionProvider::Whisper,
        model_path: Some(PathBuf::from("/opt/whisper-small")),
    };

    assert_eq!(settings.resolved_model_path(), PathBuf::from("/opt/whisper-small"));
}

#[test]
fn given_default_provider_when_checking_build_then_matches_compiled_engines() {
    let expected = if cfg!(feature = "vosk") {
        RecognitionProvider::Vosk
    } else {
        RecognitionProvider::Whisper
    };

    assert_eq!(RecognitionProvider::default(), expected);
}

#[test]
fn given_whisper_default_dir_when_loading_then_error_names_whisper_dir_not_vosk() {
    let settings = RecognitionSettings {
        provider: RecognitionProvider::Whisper,
        model_path: None,
    };

    let error = match RecognitionEngineFactory::create(
        settings.provider,
        &settings.resolved_model_path(),
    ) {
        Err(e) => e.to_string(),
        Ok(_) => return,
    };

    assert!(error.contains(DEFAULT_WHISPER_MODEL_PATH), "{}", error);
    assert!(!error.contains("vosk"), "{}", error);
}

#[test]
fn given_level_when_building_default_filter_then_covers_crate_and_http() {
    let config = TracingConfig {
        environment: "test".to_string(),
        level: "warn".to_string(),
        json_format: false,
    };

    assert_eq!(config.default_filter(), "warn,tolk=warn,tower_http=warn");
}

// The only test in this binary that touches process environment.
#[test]
fn given_env_overrides_when_loading_settings_then_layers_over_defaults() {
    unsafe {
        std::env::remove_var(MODEL_PATH_ENV);
        std::env::remove_var("APP_SERVER__PORT");
    }
    let defaults = Settings::load(Environment::Test).unwrap();
    assert_eq!(defaults.server.port, 8080);
    assert_eq!(defaults.recognition.provider, RecognitionProvider::default());
    assert_eq!(defaults.recognition.model_path, None);
    assert_eq!(
        defaults.recognition.resolved_model_path(),
        defaults.recognition.provider.default_model_path()
    );
    assert_eq!(defaults.normalizer.binary, "ffmpeg");
    assert_eq!(defaults.upload.max_file_size_mb, 50);

    unsafe {
        std::env::set_var(MODEL_PATH_ENV, "/srv/models/en");
        std::env::set_var("APP_SERVER__PORT", "9091");
        std::env::set_var("APP_RECOGNITION__PROVIDER", "mock");
    }
    let overridden = Settings::load(Environment::Test).unwrap();
    unsafe {
        std::env::remove_var(MODEL_PATH_ENV);
        std::env::remove_var("APP_SERVER__PORT");
        std::env::remove_var("APP_RECOGNITION__PROVIDER");
    }

    assert_eq!(
        overridden.recognition.resolved_model_path(),
        PathBuf::from("/srv/models/en")
    );
    assert_eq!(overridden.server.port, 9091);
    assert_eq!(overridden.recognition.provider, RecognitionProvider::Mock);
}
