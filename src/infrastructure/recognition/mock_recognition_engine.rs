use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::application::ports::{RecognitionEngine, RecognitionError, RecognizerSession};

const DEFAULT_TEXT: &str = "mock transcript";

/// Engine that ignores audio content and always recognizes the same text.
pub struct MockRecognitionEngine {
    text: String,
    sessions: Arc<AtomicUsize>,
    bytes: Arc<AtomicUsize>,
}

impl MockRecognitionEngine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sessions: Arc::new(AtomicUsize::new(0)),
            bytes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn sessions_created(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }

    pub fn bytes_received(&self) -> usize {
        self.bytes.load(Ordering::SeqCst)
    }
}

impl Default for MockRecognitionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TEXT)
    }
}

impl RecognitionEngine for MockRecognitionEngine {
    fn create_session(
        &self,
        _sample_rate: u32,
    ) -> Result<Box<dyn RecognizerSession + '_>, RecognitionError> {
        self.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            text: &self.text,
            bytes: Arc::clone(&self.bytes),
        }))
    }
}

struct MockSession<'a> {
    text: &'a str,
    bytes: Arc<AtomicUsize>,
}

impl RecognizerSession for MockSession<'_> {
    fn accept_waveform(&mut self, pcm: &[u8]) -> Result<bool, RecognitionError> {
        self.bytes.fetch_add(pcm.len(), Ordering::SeqCst);
        Ok(false)
    }

    fn final_result(self: Box<Self>) -> Result<String, RecognitionError> {
        Ok(serde_json::json!({ "text": self.text }).to_string())
    }
}
