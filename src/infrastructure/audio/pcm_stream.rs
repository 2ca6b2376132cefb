use std::fs::File;
use std::io;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

#[derive(Debug, thiserror::Error)]
pub enum PcmStreamError {
    #[error("unsupported audio container: {0}")]
    Unsupported(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Reads a WAV file back as interleaved signed 16-bit little-endian bytes.
///
/// Samples are emitted in the file's own rate and channel layout; callers
/// that need a specific profile check [`PcmStream::sample_rate`] and
/// [`PcmStream::channels`] themselves.
pub struct PcmStream {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: u16,
    pending: Vec<u8>,
    offset: usize,
    exhausted: bool,
}

impl PcmStream {
    pub fn open(path: &Path) -> Result<Self, PcmStreamError> {
        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        hint.with_extension("wav");

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| PcmStreamError::Unsupported(format!("probe: {}", e)))?;

        let format = probed.format;
        let track = format
            .default_track()
            .ok_or_else(|| PcmStreamError::Unsupported("no audio track found".to_string()))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();
        let sample_rate = codec_params
            .sample_rate
            .ok_or_else(|| PcmStreamError::Unsupported("unknown sample rate".to_string()))?;
        let channels = codec_params.channels.map(|c| c.count() as u16).unwrap_or(1);

        let decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| PcmStreamError::Unsupported(format!("codec: {}", e)))?;

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate,
            channels,
            pending: Vec::new(),
            offset: 0,
            exhausted: false,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Copies up to `buf.len()` bytes of PCM into `buf`. Returns 0 at end of
    /// stream.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, PcmStreamError> {
        while self.offset >= self.pending.len() {
            if self.exhausted || !self.decode_next_packet()? {
                return Ok(0);
            }
        }

        let available = &self.pending[self.offset..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.offset += n;
        Ok(n)
    }

    fn decode_next_packet(&mut self) -> Result<bool, PcmStreamError> {
        self.pending.clear();
        self.offset = 0;

        loop {
            let packet = match self.format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == io::ErrorKind::UnexpectedEof =>
                {
                    self.exhausted = true;
                    return Ok(false);
                }
                Err(SymphoniaError::IoError(e)) => return Err(PcmStreamError::Io(e)),
                Err(e) => {
                    return Err(PcmStreamError::Unsupported(format!("packet: {}", e)));
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::warn!(error = %e, "Skipping corrupt audio frame");
                    continue;
                }
                Err(e) => {
                    return Err(PcmStreamError::Unsupported(format!("decode: {}", e)));
                }
            };

            let spec = *decoded.spec();
            let num_frames = decoded.frames();
            if num_frames == 0 {
                continue;
            }

            let mut sample_buf = SampleBuffer::<i16>::new(num_frames as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);

            self.pending.reserve(sample_buf.samples().len() * 2);
            for sample in sample_buf.samples() {
                self.pending.extend_from_slice(&sample.to_le_bytes());
            }
            return Ok(true);
        }
    }
}
