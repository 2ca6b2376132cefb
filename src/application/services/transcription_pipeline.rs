use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tempfile::TempPath;

use crate::application::ports::{
    AudioNormalizer, NormalizeError, RecognitionEngine, RecognitionError, TranscriptionError,
    TranscriptionService,
};
use crate::domain::{PcmProfile, TranscriptionResult};
use crate::infrastructure::audio::{PcmStream, PcmStreamError};

/// Bytes handed to the recognizer per call.
pub const CHUNK_SIZE: usize = 4096;

const MAX_FILENAME_LEN: usize = 64;

/// Upload → temp file → normalizer → recognizer session → result.
///
/// Both temp files are owned [`TempPath`]s, so they are removed on every
/// return path and on unwind.
pub struct TranscriptionPipeline {
    normalizer: Arc<dyn AudioNormalizer>,
    engine: Arc<dyn RecognitionEngine>,
    profile: PcmProfile,
}

impl TranscriptionPipeline {
    pub fn new(normalizer: Arc<dyn AudioNormalizer>, engine: Arc<dyn RecognitionEngine>) -> Self {
        Self {
            normalizer,
            engine,
            profile: PcmProfile::SPEECH,
        }
    }

    async fn stage_upload(&self, audio: &[u8], filename: &str) -> io::Result<TempPath> {
        let upload = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&format!("-{}", sanitize_filename(filename)))
            .tempfile()?
            .into_temp_path();

        tokio::fs::write(&upload, audio).await?;
        Ok(upload)
    }
}

#[async_trait]
impl TranscriptionService for TranscriptionPipeline {
    #[tracing::instrument(skip(self, audio), fields(bytes = audio.len()))]
    async fn transcribe(
        &self,
        audio: &[u8],
        filename: &str,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        let start = Instant::now();

        let upload = self.stage_upload(audio, filename).await?;

        let normalized = self
            .normalizer
            .normalize(&upload)
            .await
            .map_err(classify_normalize_error);
        discard(upload);
        let normalized = normalized?;

        let engine = Arc::clone(&self.engine);
        let profile = self.profile;
        let payload = tokio::task::spawn_blocking(move || {
            let result = recognize(engine.as_ref(), &normalized, profile);
            discard(normalized);
            result
        })
        .await
        .map_err(|e| TranscriptionError::Unexpected(format!("recognition worker: {}", e)))??;

        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            payload_chars = payload.len(),
            "Transcription completed"
        );

        Ok(TranscriptionResult::ok(payload))
    }
}

fn recognize(
    engine: &dyn RecognitionEngine,
    wav: &Path,
    profile: PcmProfile,
) -> Result<String, TranscriptionError> {
    let mut stream = PcmStream::open(wav).map_err(classify_stream_error)?;

    if !profile.matches(stream.sample_rate(), stream.channels()) {
        tracing::warn!(
            sample_rate = stream.sample_rate(),
            channels = stream.channels(),
            expected_rate = profile.sample_rate,
            expected_channels = profile.channels,
            "Normalized audio does not match recognizer profile"
        );
    }

    let mut session = engine
        .create_session(profile.sample_rate)
        .map_err(classify_recognition_error)?;

    let mut buffer = [0u8; CHUNK_SIZE];
    let mut total = 0usize;
    loop {
        let n = stream.read(&mut buffer).map_err(classify_stream_error)?;
        if n == 0 {
            break;
        }
        total += n;
        // Utterance boundaries are not surfaced; only the final result is.
        session
            .accept_waveform(&buffer[..n])
            .map_err(classify_recognition_error)?;
    }

    tracing::debug!(pcm_bytes = total, "Audio streamed to recognizer");

    session.final_result().map_err(classify_recognition_error)
}

fn classify_normalize_error(error: NormalizeError) -> TranscriptionError {
    match error {
        NormalizeError::Conversion { .. } => TranscriptionError::UnsupportedMedia(error.to_string()),
        NormalizeError::Interrupted => TranscriptionError::Io(io::Error::new(
            io::ErrorKind::Interrupted,
            "audio conversion interrupted",
        )),
        NormalizeError::Io(e) => TranscriptionError::Io(e),
    }
}

fn classify_stream_error(error: PcmStreamError) -> TranscriptionError {
    match error {
        PcmStreamError::Unsupported(detail) => {
            tracing::warn!(detail = %detail, "Normalized audio could not be parsed");
            TranscriptionError::UnsupportedMedia("Unsupported audio file".to_string())
        }
        PcmStreamError::Io(e) => TranscriptionError::Io(e),
    }
}

fn classify_recognition_error(error: RecognitionError) -> TranscriptionError {
    TranscriptionError::Unexpected(error.to_string())
}

fn discard(path: TempPath) {
    let shown = path.display().to_string();
    if let Err(e) = path.close() {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %shown, error = %e, "Failed to remove temp file");
        }
    }
}

/// Reduces a client-supplied filename to a short basename that is safe to
/// embed in a temp file name.
pub fn sanitize_filename(filename: &str) -> String {
    let basename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = basename
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    let skip = trimmed.chars().count().saturating_sub(MAX_FILENAME_LEN);
    let mut safe: String = trimmed.chars().skip(skip).collect();

    if safe.is_empty() {
        safe.push_str("audio");
    }
    safe
}
