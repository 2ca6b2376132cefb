use std::io;

use async_trait::async_trait;

use crate::domain::TranscriptionResult;

#[async_trait]
pub trait TranscriptionService: Send + Sync {
    async fn transcribe(
        &self,
        audio: &[u8],
        filename: &str,
    ) -> Result<TranscriptionResult, TranscriptionError>;
}

/// Failure classes of the transcription pipeline. Each one maps to exactly
/// one HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("{0}")]
    UnsupportedMedia(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}
