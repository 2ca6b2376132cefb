use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tempfile::TempPath;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{AudioNormalizer, NormalizeError};
use crate::domain::PcmProfile;

/// Runs an ffmpeg-compatible binary to produce 16 kHz mono WAV.
///
/// The wait for the child has no timeout. Cancelling `shutdown` kills the
/// child and surfaces [`NormalizeError::Interrupted`].
pub struct FfmpegNormalizer {
    binary: String,
    shutdown: CancellationToken,
}

impl FfmpegNormalizer {
    pub fn new(binary: impl Into<String>, shutdown: CancellationToken) -> Self {
        Self {
            binary: binary.into(),
            shutdown,
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// `-y -i <input> -ar 16000 -ac 1 -f wav <output>`
    pub fn command_args(input: &Path, output: &Path) -> Vec<OsString> {
        let profile = PcmProfile::SPEECH;
        vec![
            "-y".into(),
            "-i".into(),
            input.as_os_str().to_owned(),
            "-ar".into(),
            profile.sample_rate.to_string().into(),
            "-ac".into(),
            profile.channels.to_string().into(),
            "-f".into(),
            "wav".into(),
            output.as_os_str().to_owned(),
        ]
    }

    /// Verifies the binary can be executed by running `<binary> -version`.
    pub async fn check_binary(&self) -> Result<(), NormalizeError> {
        let output = tokio::process::Command::new(&self.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(NormalizeError::Conversion {
                exit_code: output.status.code(),
            })
        }
    }
}

#[async_trait]
impl AudioNormalizer for FfmpegNormalizer {
    async fn normalize(&self, input: &Path) -> Result<TempPath, NormalizeError> {
        let output = tempfile::Builder::new()
            .prefix("converted-")
            .suffix(".wav")
            .tempfile()?
            .into_temp_path();

        let start = Instant::now();

        let mut child = tokio::process::Command::new(&self.binary)
            .args(Self::command_args(input, &output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        tracing::debug!(
            binary = %self.binary,
            input = %input.display(),
            output = %output.display(),
            "Spawned audio conversion"
        );

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = tokio::select! {
            status = child.wait() => status?,
            () = self.shutdown.cancelled() => {
                let _ = child.kill().await;
                stdout.abort();
                stderr.abort();
                tracing::warn!(
                    input = %input.display(),
                    "Audio conversion interrupted by shutdown"
                );
                return Err(NormalizeError::Interrupted);
            }
        };

        let mut combined = stdout.await.unwrap_or_default();
        combined.extend(stderr.await.unwrap_or_default());
        let duration_ms = start.elapsed().as_millis() as u64;

        if !status.success() {
            tracing::warn!(
                exit_code = ?status.code(),
                duration_ms,
                output = %String::from_utf8_lossy(&combined),
                "ffmpeg conversion failed"
            );
            return Err(NormalizeError::Conversion {
                exit_code: status.code(),
            });
        }

        tracing::debug!(
            duration_ms,
            output_bytes = combined.len(),
            "Audio normalized to 16kHz mono WAV"
        );

        Ok(output)
    }
}

fn drain<R>(pipe: Option<R>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            if let Err(e) = pipe.read_to_end(&mut buf).await {
                if e.kind() != io::ErrorKind::BrokenPipe {
                    tracing::debug!(error = %e, "Failed to read converter output");
                }
            }
        }
        buf
    })
}
