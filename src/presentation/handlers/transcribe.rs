use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::ports::TranscriptionError;
use crate::domain::TranscriptionResult;
use crate::presentation::state::AppState;

/// Multipart field carrying the audio.
pub const FILE_FIELD: &str = "file";

const NO_FILE_MESSAGE: &str = "No file uploaded";
const READ_FAILED_MESSAGE: &str = "Failed to read upload";
const IO_MESSAGE: &str = "Internal error processing audio";
const UNEXPECTED_MESSAGE: &str = "Unexpected server error";

struct Upload {
    filename: String,
    data: Bytes,
}

#[tracing::instrument(skip(state, multipart))]
pub async fn transcribe_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            tracing::warn!(reason = %rejection.body_text(), "Transcribe request is not multipart");
            return respond(StatusCode::BAD_REQUEST, TranscriptionResult::error(NO_FILE_MESSAGE));
        }
    };

    let upload = match read_file_field(&mut multipart).await {
        Ok(Some(upload)) if !upload.data.is_empty() => upload,
        Ok(_) => {
            tracing::warn!("Transcribe request with no file");
            return respond(StatusCode::BAD_REQUEST, TranscriptionResult::error(NO_FILE_MESSAGE));
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read multipart");
            return respond(e.status(), TranscriptionResult::error(READ_FAILED_MESSAGE));
        }
    };

    tracing::info!(
        filename = %upload.filename,
        bytes = upload.data.len(),
        "Received audio upload"
    );

    match state
        .transcription_service
        .transcribe(&upload.data, &upload.filename)
        .await
    {
        Ok(result) => respond(StatusCode::OK, result),
        Err(TranscriptionError::UnsupportedMedia(message)) => {
            tracing::warn!(reason = %message, "Unsupported input");
            respond(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                TranscriptionResult::error(message),
            )
        }
        Err(TranscriptionError::Io(e)) => {
            tracing::error!(error = %e, "IO error during transcription");
            respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                TranscriptionResult::error(IO_MESSAGE),
            )
        }
        Err(TranscriptionError::Unexpected(detail)) => {
            tracing::error!(error = %detail, "Unexpected error during transcription");
            respond(
                StatusCode::INTERNAL_SERVER_ERROR,
                TranscriptionResult::error(UNEXPECTED_MESSAGE),
            )
        }
    }
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Option<Upload>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let data = field.bytes().await?;
        return Ok(Some(Upload { filename, data }));
    }
    Ok(None)
}

fn respond(status: StatusCode, result: TranscriptionResult) -> Response {
    tracing::debug!(
        http_status = status.as_u16(),
        outcome = %result.status(),
        "Transcribe response"
    );
    (status, Json(result)).into_response()
}
