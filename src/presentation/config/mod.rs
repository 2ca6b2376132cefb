mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    LoggingSettings, MODEL_PATH_ENV, NormalizerSettings, RecognitionSettings,
    ServerSettings, Settings, UploadSettings,
};
