/// A loaded speech model shared by every request.
///
/// Implementations are immutable once constructed. Each request opens its own
/// [`RecognizerSession`]; sessions never share state with each other.
pub trait RecognitionEngine: Send + Sync {
    fn create_session(
        &self,
        sample_rate: u32,
    ) -> Result<Box<dyn RecognizerSession + '_>, RecognitionError>;
}

/// Short-lived decoder bound to a [`RecognitionEngine`].
pub trait RecognizerSession: Send {
    /// Feeds signed 16-bit little-endian PCM. Returns `true` when the engine
    /// reached an utterance boundary.
    fn accept_waveform(&mut self, pcm: &[u8]) -> Result<bool, RecognitionError>;

    /// Consumes the session and returns the engine's serialized result.
    fn final_result(self: Box<Self>) -> Result<String, RecognitionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    #[error("model loading failed: {0}")]
    ModelLoadFailed(String),
    #[error("session creation failed: {0}")]
    SessionFailed(String),
    #[error("recognition failed: {0}")]
    RecognitionFailed(String),
}
