use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionStatus {
    Ok,
    Error,
}

impl TranscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptionStatus::Ok => "ok",
            TranscriptionStatus::Error => "error",
        }
    }
}

impl fmt::Display for TranscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one transcription request, serialized as the response body.
///
/// On success `transcript` carries the engine payload verbatim; on failure it
/// carries a message that is safe to show to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptionResult {
    status: TranscriptionStatus,
    transcript: String,
}

impl TranscriptionResult {
    pub fn ok(transcript: impl Into<String>) -> Self {
        Self {
            status: TranscriptionStatus::Ok,
            transcript: transcript.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: TranscriptionStatus::Error,
            transcript: message.into(),
        }
    }

    pub fn status(&self) -> TranscriptionStatus {
        self.status
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn is_ok(&self) -> bool {
        self.status == TranscriptionStatus::Ok
    }
}
