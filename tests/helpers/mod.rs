#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempPath;

use tolk::application::ports::{AudioNormalizer, NormalizeError};

pub const BOUNDARY: &str = "tolk-test-boundary";

pub fn build_wav(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
    let data_size = (samples.len() * 2) as u32;
    let block_align = channels * 2;
    let byte_rate = sample_rate * u32::from(block_align);
    let file_size = 36 + data_size;

    let mut wav = Vec::with_capacity(44 + data_size as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&file_size.to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    for &s in samples {
        wav.extend_from_slice(&s.to_le_bytes());
    }
    wav
}

/// A short ramp so the PCM payload is not all zeros.
pub fn speech_like_samples(count: usize) -> Vec<i16> {
    (0..count).map(|i| ((i % 200) as i16 - 100) * 50).collect()
}

pub fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_text_body(field: &str, value: &str) -> Vec<u8> {
    format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"\r\n\r\n{v}\r\n--{b}--\r\n",
        b = BOUNDARY,
        f = field,
        v = value
    )
    .into_bytes()
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

/// Paths the pipeline handed to a normalizer and the outputs it got back.
#[derive(Default, Clone)]
pub struct SeenPaths {
    inner: Arc<Mutex<Vec<PathBuf>>>,
}

impl SeenPaths {
    pub fn record(&self, path: &Path) {
        self.inner.lock().unwrap().push(path.to_path_buf());
    }

    pub fn all(&self) -> Vec<PathBuf> {
        self.inner.lock().unwrap().clone()
    }
}

pub enum StubBehavior {
    /// Copy the input unchanged, like a converter that is already happy.
    Copy,
    /// Exit 0 but leave bytes no WAV reader accepts.
    Garbage,
    Fail,
    Interrupt,
}

/// Stand-in for the ffmpeg adapter.
pub struct StubNormalizer {
    pub behavior: StubBehavior,
    pub seen: SeenPaths,
}

impl StubNormalizer {
    pub fn new(behavior: StubBehavior) -> Self {
        Self {
            behavior,
            seen: SeenPaths::default(),
        }
    }
}

#[async_trait]
impl AudioNormalizer for StubNormalizer {
    async fn normalize(&self, input: &Path) -> Result<TempPath, NormalizeError> {
        self.seen.record(input);
        assert!(input.exists(), "upload must be staged before normalizing");

        let output = tempfile::Builder::new()
            .prefix("converted-")
            .suffix(".wav")
            .tempfile()?
            .into_temp_path();
        self.seen.record(&output);

        match self.behavior {
            StubBehavior::Copy => {
                std::fs::copy(input, &output)?;
                Ok(output)
            }
            StubBehavior::Garbage => {
                std::fs::write(&output, b"definitely not a riff container")?;
                Ok(output)
            }
            StubBehavior::Fail => Err(NormalizeError::Conversion { exit_code: Some(1) }),
            StubBehavior::Interrupt => Err(NormalizeError::Interrupted),
        }
    }
}

/// Writes an executable shell script standing in for ffmpeg. The output path
/// is the tenth argument of the fixed command line.
#[cfg(unix)]
pub fn fake_converter(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    {
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "#!/bin/sh").unwrap();
        writeln!(file, "{}", body).unwrap();
        file.sync_all().unwrap();
    }
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

pub fn ffmpeg_available() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
