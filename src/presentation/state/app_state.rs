use std::sync::Arc;

use crate::application::ports::TranscriptionService;

#[derive(Clone)]
pub struct AppState {
    pub transcription_service: Arc<dyn TranscriptionService>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

    pub fn new(transcription_service: Arc<dyn TranscriptionService>) -> Self {
        Self {
            transcription_service,
            max_upload_bytes: Self::DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
