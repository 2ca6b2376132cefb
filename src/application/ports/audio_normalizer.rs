use std::io;
use std::path::Path;

use async_trait::async_trait;
use tempfile::TempPath;

/// Converts arbitrary input audio into 16 kHz mono WAV.
///
/// The returned path is owned by the caller and removed when dropped.
#[async_trait]
pub trait AudioNormalizer: Send + Sync {
    async fn normalize(&self, input: &Path) -> Result<TempPath, NormalizeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("Unsupported audio or ffmpeg conversion failed")]
    Conversion { exit_code: Option<i32> },
    #[error("audio conversion interrupted")]
    Interrupted,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
